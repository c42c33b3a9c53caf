//! Oracle prompt assembly from session history

use crate::oracle::ContentPart;
use crate::session::HistoryEntry;

/// Default system instruction for framing advice
pub const SYSTEM_PROMPT: &str = r#"
You are a professional photography composition assistant.
Analyze the image sequence and the previous suggestions, then give one concise, actionable framing instruction for the latest image.

- **Analyze**: compare against the history and judge the composition of the latest image.
- **Suggest**: if the composition is poor, give a single instruction starting with a verb (e.g. "Move the camera left", "Shoot from a lower position", "Step back", "Tilt the camera up", "Rotate the camera right", "Zoom in"). Give no other information.
- **Done**: if the composition is good, leave the suggestion empty.

**Output format** (strict JSON):
{
  "ready_to_shoot": 0, // 0: needs adjustment, 1: ready to shoot
  "suggestion": "Move left"
}
"#;

/// Opening marker when the session has no history yet
pub const FIRST_FRAME_MARKER: &str =
    "This is the first image. Provide an initial framing suggestion.";

/// Opening marker when prior turns are included
pub const HISTORY_MARKER: &str =
    "History (image, suggestion) follows. Provide the next instruction for the latest image.";

/// Label placed before the newest artifact
pub const LATEST_MARKER: &str = "Latest image:";

/// Shown in place of an empty prior suggestion
pub const EMPTY_SUGGESTION: &str = "none";

/// Build the user content for one turn.
///
/// History is emitted oldest first, exactly as stored.
#[must_use]
pub fn assemble(history: &[HistoryEntry], artifact: &str) -> Vec<ContentPart> {
    if history.is_empty() {
        return vec![
            ContentPart::text(FIRST_FRAME_MARKER),
            ContentPart::image(artifact),
        ];
    }

    let mut parts = Vec::with_capacity(history.len() * 2 + 3);
    parts.push(ContentPart::text(HISTORY_MARKER));

    for (i, entry) in history.iter().enumerate() {
        let directive = if entry.directive.is_empty() {
            EMPTY_SUGGESTION
        } else {
            entry.directive.as_str()
        };
        parts.push(ContentPart::image(entry.artifact.as_str()));
        parts.push(ContentPart::text(format!("Suggestion {}: '{directive}'", i + 1)));
    }

    parts.push(ContentPart::text(LATEST_MARKER));
    parts.push(ContentPart::image(artifact));
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_turn_has_marker_and_artifact_only() {
        let parts = assemble(&[], "data:new");

        assert_eq!(
            parts,
            vec![
                ContentPart::text(FIRST_FRAME_MARKER),
                ContentPart::image("data:new"),
            ]
        );
    }

    #[test]
    fn test_history_is_interleaved_oldest_first() {
        let history = vec![
            HistoryEntry::new("data:1", "Move left"),
            HistoryEntry::new("data:2", "Tilt up"),
        ];

        let parts = assemble(&history, "data:3");

        assert_eq!(
            parts,
            vec![
                ContentPart::text(HISTORY_MARKER),
                ContentPart::image("data:1"),
                ContentPart::text("Suggestion 1: 'Move left'"),
                ContentPart::image("data:2"),
                ContentPart::text("Suggestion 2: 'Tilt up'"),
                ContentPart::text(LATEST_MARKER),
                ContentPart::image("data:3"),
            ]
        );
    }

    #[test]
    fn test_empty_prior_suggestion_uses_placeholder() {
        let history = vec![HistoryEntry::new("data:1", "")];

        let parts = assemble(&history, "data:2");

        assert_eq!(parts[2], ContentPart::text("Suggestion 1: 'none'"));
    }

    #[test]
    fn test_repeated_artifacts_are_kept() {
        let history = vec![
            HistoryEntry::new("data:same", "a"),
            HistoryEntry::new("data:same", "a"),
        ];

        let parts = assemble(&history, "data:same");

        let images = parts
            .iter()
            .filter(|p| matches!(p, ContentPart::ImageUrl { .. }))
            .count();
        assert_eq!(images, 3);
    }
}
