//! Parsing of the module -> lessons JSON the structure prompt asks for.

use crate::error::PipelineError;
use common::model::course::{CourseOutline, ModuleOutline};
use serde_json::Value;

/// Parse `{"<module>": ["<lesson>", ...], ...}` into a [`CourseOutline`].
///
/// Module order follows the key order of the text. A surrounding Markdown
/// code fence is ignored.
pub fn parse_outline(text: &str) -> Result<CourseOutline, PipelineError> {
    let body = strip_code_fence(text);
    let value: Value =
        serde_json::from_str(body).map_err(|e| PipelineError::OutlineParse(e.to_string()))?;

    let Value::Object(map) = value else {
        return Err(PipelineError::OutlineParse(
            "expected a JSON object of modules".to_string(),
        ));
    };

    let mut modules = Vec::with_capacity(map.len());
    for (name, lessons) in map {
        let Value::Array(items) = lessons else {
            return Err(PipelineError::OutlineParse(format!(
                "lessons of module '{name}' are not a list"
            )));
        };
        let lessons = items
            .into_iter()
            .map(|item| match item {
                Value::String(lesson) => Ok(lesson),
                other => Err(PipelineError::OutlineParse(format!(
                    "lesson {other} of module '{name}' is not a string"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        modules.push(ModuleOutline { name, lessons });
    }

    if modules.is_empty() {
        return Err(PipelineError::OutlineParse("the outline has no modules".to_string()));
    }

    Ok(CourseOutline { modules })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) up to the end of the opening line.
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_modules_in_text_order() {
        let outline =
            parse_outline(r#"{"Zeta": ["L1", "L2"], "Alpha": ["L3"], "Mid": []}"#).unwrap();
        let names: Vec<_> = outline.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
        assert_eq!(outline.module("Zeta").unwrap().lessons, vec!["L1", "L2"]);
        assert_eq!(outline.total_lessons(), 3);
    }

    #[test]
    fn single_module() {
        let outline = parse_outline(r#"{"M1": ["L1","L2"]}"#).unwrap();
        assert_eq!(
            outline,
            CourseOutline {
                modules: vec![ModuleOutline {
                    name: "M1".to_string(),
                    lessons: vec!["L1".to_string(), "L2".to_string()],
                }]
            }
        );
    }

    #[test]
    fn code_fence_is_stripped() {
        let text = "```json\n{\"模块一\": [\"课程1\"]}\n```";
        let outline = parse_outline(text).unwrap();
        assert_eq!(outline.modules[0].name, "模块一");
        assert_eq!(outline.modules[0].lessons, vec!["课程1"]);

        let bare_fence = "```\n{\"M\": [\"L\"]}\n```\n";
        assert_eq!(parse_outline(bare_fence).unwrap().total_lessons(), 1);
    }

    #[test]
    fn unquoted_lesson_is_a_parse_failure() {
        let err = parse_outline(r#"{"M1": [L1]}"#).unwrap_err();
        assert!(matches!(err, PipelineError::OutlineParse(_)));
    }

    #[test]
    fn wrong_shapes_are_parse_failures() {
        for text in [
            r#"["M1", "M2"]"#,
            r#"{"M1": "L1"}"#,
            r#"{"M1": [1, 2]}"#,
            "{}",
            "not json at all",
        ] {
            assert!(
                matches!(parse_outline(text), Err(PipelineError::OutlineParse(_))),
                "{text}"
            );
        }
    }
}
