use serde::{Deserialize, Serialize};
use vrt_core::{ExperimentError, InputSignal};
use winit::keyboard::KeyCode;

/// Key that counts as "user responded".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKey {
    #[default]
    Space,
    F,
    J,
}

impl ResponseKey {
    pub fn key_code(&self) -> KeyCode {
        match self {
            ResponseKey::Space => KeyCode::Space,
            ResponseKey::F => KeyCode::KeyF,
            ResponseKey::J => KeyCode::KeyJ,
        }
    }

    /// Name shown in the on-screen instructions.
    pub fn label(&self) -> &'static str {
        match self {
            ResponseKey::Space => "SPACE",
            ResponseKey::F => "F",
            ResponseKey::J => "J",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Signal(InputSignal),
    Exit,
}

/// Maps a pressed key onto what the experiment understands.
pub fn classify_key(
    code: KeyCode,
    response_key: ResponseKey,
) -> Result<KeyAction, ExperimentError> {
    if code == response_key.key_code() {
        return Ok(KeyAction::Signal(InputSignal::Respond));
    }
    match code {
        KeyCode::Enter | KeyCode::NumpadEnter => Ok(KeyAction::Signal(InputSignal::Control)),
        KeyCode::Escape => Ok(KeyAction::Exit),
        other => Err(ExperimentError::UnrecognizedInput(format!("{other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_response_key_is_space() {
        assert_eq!(
            classify_key(KeyCode::Space, ResponseKey::default()),
            Ok(KeyAction::Signal(InputSignal::Respond))
        );
        assert_eq!(
            classify_key(KeyCode::Enter, ResponseKey::Space),
            Ok(KeyAction::Signal(InputSignal::Control))
        );
        assert_eq!(classify_key(KeyCode::Escape, ResponseKey::Space), Ok(KeyAction::Exit));
    }

    #[test]
    fn other_keys_are_unrecognized() {
        let err = classify_key(KeyCode::KeyA, ResponseKey::Space).unwrap_err();
        assert!(matches!(err, ExperimentError::UnrecognizedInput(ref k) if k == "KeyA"));
        assert!(!err.is_fatal());
        // Space is just another key once a letter is the response key.
        assert!(classify_key(KeyCode::Space, ResponseKey::J).is_err());
    }
}
