use crate::serializers::FieldErrors;

/// Parse a comma-separated id list such as `?tags=1,2`.
///
/// A missing or blank parameter means "no filter" and yields `None`. Any token
/// that is not an integer fails with an error keyed by `field`.
pub fn parse_id_list(field: &str, raw: Option<&str>) -> Result<Option<Vec<i64>>, FieldErrors> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let mut ids = Vec::new();
    for token in raw.split(',') {
        let token = token.trim();
        match token.parse::<i64>() {
            Ok(id) => ids.push(id),
            Err(_) => {
                return Err(FieldErrors::single(
                    field,
                    format!("Expected a comma-separated list of integers, got \"{}\".", token),
                ))
            }
        }
    }
    Ok(Some(ids))
}

/// Boolean query flag: `1`/`true`/`yes` are on, `0`/`false`/`no`/blank are off.
pub fn parse_flag(field: &str, raw: Option<&str>) -> Result<bool, FieldErrors> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("0") | Some("false") | Some("no") => Ok(false),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some(other) => Err(FieldErrors::single(
            field,
            format!("\"{}\" is not a valid boolean.", other),
        )),
    }
}

/// Non-negative integer such as `?limit=20`. Blank means unset.
pub fn parse_count(field: &str, raw: Option<&str>) -> Result<Option<i64>, FieldErrors> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<i64>() {
        Ok(n) if n >= 0 => Ok(Some(n)),
        _ => Err(FieldErrors::single(field, "A valid non-negative integer is required.")),
    }
}
