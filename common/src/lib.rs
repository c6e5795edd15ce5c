pub mod config;
pub mod format;
pub mod logger;

use validator::ValidationErrors;

/// Flattens `validator` output into one human-readable line, falling back to
/// the rule code for constraints that carry no custom message.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{field}: {}", e.code),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "title must not be empty"))]
        title: String,
        #[validate(range(min = 1, max = 5))]
        rating: u8,
    }

    #[test]
    fn joins_messages_and_falls_back_to_codes() {
        let bad = Payload {
            title: String::new(),
            rating: 9,
        };
        let rendered = format_validation_errors(&bad.validate().unwrap_err());

        assert!(rendered.contains("title must not be empty"));
        assert!(rendered.contains("rating"));
    }
}
