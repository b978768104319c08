//! Static triage tables
//!
//! Symptom categories, their red-flag checklists, the vital-sign groups
//! each category asks about, and the fixed risk factor list. All lookups
//! are keyed by enum, never by label.

use serde::{Deserialize, Serialize};

/// Main symptom category picked on the first step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SymptomCategory {
    ChestPain,
    Breathing,
    Fever,
    Dizziness,
    AbdominalPain,
    Trauma,
    /// Free-text complaint without a protocol
    Other,
}

impl SymptomCategory {
    /// Categories offered on the category grid, in display order
    pub const KNOWN: [SymptomCategory; 6] = [
        SymptomCategory::ChestPain,
        SymptomCategory::Breathing,
        SymptomCategory::Fever,
        SymptomCategory::Dizziness,
        SymptomCategory::AbdominalPain,
        SymptomCategory::Trauma,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SymptomCategory::ChestPain => "Dolor Torácico",
            SymptomCategory::Breathing => "Dificultad Respiratoria",
            SymptomCategory::Fever => "Fiebre / Escalofríos",
            SymptomCategory::Dizziness => "Mareo o Desmayo",
            SymptomCategory::AbdominalPain => "Dolor Abdominal",
            SymptomCategory::Trauma => "Traumatismos",
            SymptomCategory::Other => "Otro",
        }
    }

    /// Conditions the category card warns about
    pub fn alert_hint(&self) -> Option<&'static str> {
        match self {
            SymptomCategory::ChestPain => Some("Posible IAM, Disección Aórtica, Embolia Pulmonar"),
            SymptomCategory::Breathing => Some("Neumotórax, Asma severa, Edema agudo"),
            SymptomCategory::Fever => Some("Sepsis, Meningitis, Infección grave"),
            SymptomCategory::Dizziness => Some("Ictus, Arritmia, Hipoglucemia severa"),
            SymptomCategory::AbdominalPain => Some("Apendicitis, Perforación, Obstrucción"),
            SymptomCategory::Trauma => Some("Fractura expuesta, Hemorragia interna, TCE"),
            SymptomCategory::Other => None,
        }
    }

    /// True for every category except `Other`
    pub fn is_known(&self) -> bool {
        !matches!(self, SymptomCategory::Other)
    }

    /// Look up a category by its display label (case-insensitive)
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().to_lowercase();
        Self::KNOWN
            .iter()
            .chain(std::iter::once(&SymptomCategory::Other))
            .copied()
            .find(|c| c.label().to_lowercase() == wanted)
    }
}

/// Red-flag checklist for a known category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedFlagProtocol {
    pub title: &'static str,
    pub checks: &'static [&'static str],
}

/// Prompt shown when no checklist applies
pub const GENERIC_RED_FLAG_PROMPT: &str = "Por favor, describe cualquier otro síntoma preocupante como: dificultad para respirar, dolor opresivo, sangrado, confusión o pérdida de fuerza.";

const CHEST_PAIN: RedFlagProtocol = RedFlagProtocol {
    title: "Evaluaremos si hay características de alarma cardíaca:",
    checks: &[
        "Dolor opresivo (como un peso) o irradiado a brazo/mandíbula",
        "Náuseas o sudor frío profuso",
        "Disnea (sensación de falta de aire)",
        "Antecedentes de riesgo cardiovascular importantes",
    ],
};

const BREATHING: RedFlagProtocol = RedFlagProtocol {
    title: "Confirmaré si existe dificultad respiratoria grave:",
    checks: &[
        "Imposibilidad de hablar con frases completas",
        "Ruidos al respirar (sibilancias/estridor)",
        "Coloración azulada en labios o dedos",
        "Empeoramiento muy rápido en minutos",
    ],
};

const FEVER: RedFlagProtocol = RedFlagProtocol {
    title: "Exploraré sospecha de infección grave o sepsis:",
    checks: &[
        "Confusión o desorientación mental",
        "Taquipnea (respiración muy rápida)",
        "Escalofríos intensos con temblor",
        "Manchas en la piel que no desaparecen al presionar",
    ],
};

const DIZZINESS: RedFlagProtocol = RedFlagProtocol {
    title: "Preguntaré por signos neurológicos (Posible Ictus):",
    checks: &[
        "Debilidad brusca en un lado del cuerpo",
        "Habla alterada o dificultad para entender",
        "Pérdida de consciencia completa (desmayo)",
        "Visión doble o pérdida de visión brusca",
    ],
};

const ABDOMINAL_PAIN: RedFlagProtocol = RedFlagProtocol {
    title: "Buscaré signos de abdomen agudo:",
    checks: &[
        "Rigidez abdominal (vientre duro como una tabla)",
        "Vómitos persistentes o con sangre",
        "Fiebre alta (>38.5ºC)",
        "Heces negras o con sangre",
    ],
};

const TRAUMA: RedFlagProtocol = RedFlagProtocol {
    title: "Evaluaremos gravedad del trauma:",
    checks: &[
        "Golpe craneal con vómitos o sueño excesivo",
        "Déficit neurológico (no mueve bien una extremidad)",
        "Deformidad evidente en huesos",
        "Hemorragia activa que no cesa",
    ],
};

/// Checklist for the category, `None` means the generic prompt applies
pub fn red_flag_protocol(category: Option<SymptomCategory>) -> Option<&'static RedFlagProtocol> {
    match category? {
        SymptomCategory::ChestPain => Some(&CHEST_PAIN),
        SymptomCategory::Breathing => Some(&BREATHING),
        SymptomCategory::Fever => Some(&FEVER),
        SymptomCategory::Dizziness => Some(&DIZZINESS),
        SymptomCategory::AbdominalPain => Some(&ABDOMINAL_PAIN),
        SymptomCategory::Trauma => Some(&TRAUMA),
        SymptomCategory::Other => None,
    }
}

/// Vital-sign sub-forms of step 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VitalGroup {
    /// Oxygen saturation and speech difficulty
    Respiratory,
    /// Temperature
    Fever,
    /// Loss of consciousness
    Neurological,
    /// Active bleeding
    Bleeding,
}

impl VitalGroup {
    pub const ALL: [VitalGroup; 4] = [
        VitalGroup::Respiratory,
        VitalGroup::Fever,
        VitalGroup::Neurological,
        VitalGroup::Bleeding,
    ];

    /// Categories whose protocol asks for this group
    pub fn categories(&self) -> &'static [SymptomCategory] {
        match self {
            VitalGroup::Respiratory => &[SymptomCategory::ChestPain, SymptomCategory::Breathing],
            VitalGroup::Fever => &[SymptomCategory::Fever],
            VitalGroup::Neurological => &[SymptomCategory::Dizziness],
            VitalGroup::Bleeding => &[SymptomCategory::Trauma],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VitalGroup::Respiratory => "Respiratorio",
            VitalGroup::Fever => "Fiebre",
            VitalGroup::Neurological => "Neurológico",
            VitalGroup::Bleeding => "Sangrado",
        }
    }
}

/// Vital groups shown for a category.
///
/// An unset category shows the union of every group. A selected category
/// shows only the groups that list it, which may be none (`Other` is in
/// no group).
pub fn vital_groups(category: Option<SymptomCategory>) -> Vec<VitalGroup> {
    match category {
        None => VitalGroup::ALL.to_vec(),
        Some(cat) => VitalGroup::ALL
            .iter()
            .copied()
            .filter(|g| g.categories().contains(&cat))
            .collect(),
    }
}

/// Background conditions asked on step 6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskFactor {
    Hypertension,
    Diabetes,
    HeartDisease,
    AsthmaCopd,
    Immunosuppression,
    Pregnancy,
    Anticoagulation,
    SevereAllergies,
    AgeOver65,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 9] = [
        RiskFactor::Hypertension,
        RiskFactor::Diabetes,
        RiskFactor::HeartDisease,
        RiskFactor::AsthmaCopd,
        RiskFactor::Immunosuppression,
        RiskFactor::Pregnancy,
        RiskFactor::Anticoagulation,
        RiskFactor::SevereAllergies,
        RiskFactor::AgeOver65,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskFactor::Hypertension => "Hipertensión",
            RiskFactor::Diabetes => "Diabetes",
            RiskFactor::HeartDisease => "Cardiopatía",
            RiskFactor::AsthmaCopd => "Asma/EPOC",
            RiskFactor::Immunosuppression => "Inmunosupresión",
            RiskFactor::Pregnancy => "Embarazo",
            RiskFactor::Anticoagulation => "Anticoagulación",
            RiskFactor::SevereAllergies => "Alergias graves",
            RiskFactor::AgeOver65 => "Edad > 65 años",
        }
    }
}
