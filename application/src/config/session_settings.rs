//! Session settings.
//!
//! The parameters a [`ResponseSession`](crate::use_cases::response_session::ResponseSession)
//! passes to the gateway every time it creates a chat session. They are fixed
//! for the lifetime of the response session, so a recreated session behaves
//! like the one it replaces.

use cnxh_domain::{Model, Persona};

#[derive(Debug, Clone)]
pub struct SessionSettings {
    model: Model,
    system_instruction: String,
}

impl SessionSettings {
    pub fn new(model: Model, system_instruction: impl Into<String>) -> Self {
        Self {
            model,
            system_instruction: system_instruction.into(),
        }
    }

    /// Settings for `model` using the persona's system instruction
    pub fn from_persona(model: Model, persona: &Persona) -> Self {
        Self::new(model, persona.system_instruction())
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_persona(Model::default(), &Persona::default())
    }
}
