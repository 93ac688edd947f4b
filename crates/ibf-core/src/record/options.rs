use serde::{Deserialize, Serialize};

/// How the declared `record_size` header field is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeCheck {
    /// The field is informational only (device behaviour).
    #[default]
    Ignore,
    /// The field must equal the number of bytes the decoder consumed.
    Strict,
}

/// Decoder configuration.
///
/// # Examples
/// ```
/// use ibf_core::{DecodeOptions, SizeCheck};
///
/// let options: DecodeOptions = serde_json::from_str(r#"{"size_check":"strict"}"#).unwrap();
/// assert_eq!(options, DecodeOptions::strict());
/// assert_eq!(DecodeOptions::default().size_check, SizeCheck::Ignore);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub size_check: SizeCheck,
}

impl DecodeOptions {
    pub fn strict() -> Self {
        Self {
            size_check: SizeCheck::Strict,
        }
    }
}
