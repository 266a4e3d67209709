use super::error::OcrError;

/// Valid page segmentation modes accepted by `tesseract --psm`.
pub const MAX_PSM: u8 = 13;

/// Check a tesseract language argument such as `eng` or `eng+deu`.
///
/// Codes are traineddata names: ASCII letters, digits and `_`. Whether the
/// data file is installed is only known when tesseract runs.
pub fn validate_language_code(lang: &str) -> Result<(), OcrError> {
    if lang.is_empty() {
        return Err(OcrError::InvalidLanguageCode("language must not be empty".to_string()));
    }

    for code in lang.split('+') {
        let valid = !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(OcrError::InvalidLanguageCode(lang.to_string()));
        }
    }

    Ok(())
}

pub fn validate_psm(psm: u8) -> Result<(), OcrError> {
    if psm > MAX_PSM {
        return Err(OcrError::InvalidConfiguration(format!(
            "psm must be between 0 and {}, got {}",
            MAX_PSM, psm
        )));
    }
    Ok(())
}
