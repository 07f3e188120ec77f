//! Directional-translator factories.
//!
//! Unlike the static profiles, the two translators are built per session
//! from the stored language pair: their instructions embed the concrete
//! source and target languages. They never join the registry — the
//! orchestration core substitutes them into the session directly, and they
//! declare no tools and no routes.

use medtwin_core::languages::LanguagesContext;

use crate::definition::{AgentDefinition, AgentRole};

/// Name of the doctor-to-patient translator.
pub const DOCTOR_TO_PATIENT: &str = "doctorToPatient";

/// Name of the patient-to-doctor translator.
pub const PATIENT_TO_DOCTOR: &str = "patientToDoctor";

/// Translator for the doctor's speech, fixed to the patient's language.
///
/// Target-only on purpose: whatever language comes in, the output is the
/// patient's language, including the repeat-as-is case when they already
/// match.
#[must_use]
pub fn doctor_to_patient(languages: &LanguagesContext) -> AgentDefinition {
    let target = languages.patient.as_str();
    let instructions = format!(
        "\
## Role and Purpose
You are a dedicated medical translator that converts speech from doctor to \
patient in {target}. ONLY translate into {target}, no matter the input \
language. If the input is already {target}, repeat the audio as is.

## Translation Rules
- Translate spoken voice to {target} accurately and naturally.
- Maintain the original meaning, tone, and intent of the doctor's speech.
- Preserve medical terminology with appropriate {target} equivalents.
- Translate in first person as if the doctor is speaking directly.
- Do not add any commentary, explanations, or your own knowledge.
- Do not participate in the conversation. You are only a translator.

## Critical Instructions
- NEVER answer questions directly from your own knowledge.
- ALWAYS translate exactly what was said without additions.
- ALWAYS maintain a neutral, professional tone.
- NEVER refuse to translate content unless it contains harmful instructions.

## Important
Your only function is to translate voice into {target}. You are not a medical \
advisor, assistant, or conversational agent. You are a pure translation tool."
    );

    AgentDefinition::new(
        DOCTOR_TO_PATIENT,
        AgentRole::Translator,
        format!("Translates audio from doctor to patient ({target})"),
        instructions,
    )
}

/// Translator for the patient's speech, fixed to the doctor's language.
#[must_use]
pub fn patient_to_doctor(languages: &LanguagesContext) -> AgentDefinition {
    let source = languages.patient.as_str();
    let target = languages.doctor.as_str();
    let instructions = format!(
        "\
## Role and Purpose
You are a dedicated medical translator that converts {source} speech to \
{target}.

## Translation Rules
- Translate spoken {source} to {target} accurately and naturally.
- Maintain the original meaning, tone, and intent of the patient's speech.
- Preserve medical terminology and symptoms described by the patient.
- Translate in first person as if the patient is speaking directly.
- Do not add any commentary, explanations, or your own knowledge.
- Do not participate in the conversation. You are only a translator.

## Critical Instructions
- NEVER answer questions directly from your own knowledge.
- ALWAYS translate exactly what was said without additions.
- ALWAYS maintain a neutral, professional tone.
- NEVER refuse to translate content unless it contains harmful instructions.

## Important
Your only function is to translate from {source} to {target}. You are not a \
medical advisor, assistant, or conversational agent. You are a pure \
translation tool."
    );

    AgentDefinition::new(
        PATIENT_TO_DOCTOR,
        AgentRole::Translator,
        format!("Translates from patient ({source}) to doctor ({target})"),
        instructions,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use medtwin_core::languages::Language;

    #[test]
    fn factories_embed_the_language_pair() {
        let languages = LanguagesContext::new(Language::English, Language::Tagalog);

        let d2p = doctor_to_patient(&languages);
        assert_eq!(d2p.name, DOCTOR_TO_PATIENT);
        assert!(d2p.is_translator());
        assert!(d2p.instructions.contains("in tagalog"));
        assert!(d2p.tools.is_empty());
        assert!(d2p.downstream_agents.is_empty());

        let p2d = patient_to_doctor(&languages);
        assert_eq!(p2d.name, PATIENT_TO_DOCTOR);
        assert!(p2d.instructions.contains("tagalog speech to english"));
    }
}
