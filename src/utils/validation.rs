use crate::utils::error::{ReportError, Result};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: &str, reason: impl Into<String>) -> ReportError {
    ReportError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// http(s) 下載網址
pub fn validate_url(field: &str, raw: &str) -> Result<()> {
    if raw.is_empty() {
        return Err(invalid(field, raw, "URL cannot be empty"));
    }

    let url = Url::parse(raw).map_err(|e| invalid(field, raw, format!("Invalid URL format: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            raw,
            format!("Unsupported URL scheme: {}", url.scheme()),
        ));
    }
    Ok(())
}

pub fn validate_path(field: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field, path, "Path contains null bytes"));
    }
    Ok(())
}

/// 資料來源可以是本機路徑或 http(s) URL，副檔名需為支援的格式
pub fn validate_source(field: &str, source: &str, extensions: &[&str]) -> Result<()> {
    if source.starts_with("http://") || source.starts_with("https://") {
        validate_url(field, source)?;
    } else {
        validate_path(field, source)?;
    }
    validate_file_extensions(field, &[source.to_string()], extensions)
}

pub fn validate_file_extensions(field: &str, files: &[String], extensions: &[&str]) -> Result<()> {
    for file in files {
        // URL 可能帶查詢字串，只看路徑部分
        let path_part = file.split(['?', '#']).next().unwrap_or(file);
        let extension = Path::new(path_part)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| invalid(field, file, "File has no extension"))?;

        if !extensions.contains(&extension.as_str()) {
            return Err(invalid(
                field,
                file,
                format!(
                    "Unsupported file extension: {}. Supported: {}",
                    extension,
                    extensions.join(", ")
                ),
            ));
        }
    }
    Ok(())
}

pub fn validate_non_empty_string(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field,
            &value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// top_n 之類的設定只接受固定間距
pub fn validate_step(field: &str, value: usize, step: usize) -> Result<()> {
    if step > 0 && value % step != 0 {
        return Err(invalid(
            field,
            &value.to_string(),
            format!("Value must be a multiple of {}", step),
        ));
    }
    Ok(())
}

pub fn validate_choices(field: &str, values: &[String], allowed: &[&str]) -> Result<()> {
    match values.iter().find(|v| !allowed.contains(&v.as_str())) {
        Some(unknown) => Err(invalid(
            field,
            unknown,
            format!("Unsupported value. Valid values: {}", allowed.join(", ")),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source", "https://example.com/stock.xlsx").is_ok());
        assert!(validate_url("source", "http://example.com").is_ok());
        assert!(validate_url("source", "").is_err());
        assert!(validate_url("source", "invalid-url").is_err());
        assert!(validate_url("source", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_source() {
        let allowed = ["xlsx", "csv"];
        assert!(validate_source("source", "Stock - Sept 24.xlsx", &allowed).is_ok());
        assert!(validate_source("source", "https://host/exports/stock.csv?v=2", &allowed).is_ok());
        assert!(validate_source("source", "DATA.XLSX", &allowed).is_ok());
        assert!(validate_source("source", "stock.pdf", &allowed).is_err());
        assert!(validate_source("source", "stock", &allowed).is_err());
        assert!(validate_source("source", "", &allowed).is_err());
    }

    #[test]
    fn test_validate_range_and_step() {
        assert!(validate_range("top_n", 20, 5, 50).is_ok());
        assert!(validate_range("top_n", 55, 5, 50).is_err());
        assert!(validate_step("top_n", 20, 5).is_ok());
        assert!(validate_step("top_n", 22, 5).is_err());
    }

    #[test]
    fn test_validate_choices() {
        let formats = vec!["json".to_string(), "md".to_string()];
        assert!(validate_choices("formats", &formats, &["json", "csv", "md"]).is_ok());

        let invalid = vec!["json".to_string(), "pdf".to_string()];
        let err = validate_choices("formats", &invalid, &["json", "csv", "md"]).unwrap_err();
        assert!(err.to_string().contains("'pdf'"));
    }
}
