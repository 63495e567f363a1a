//! Plain-text results report, suitable for copying into a chat assistant.

use std::fmt;

use uebung_core::Evaluation;
use uebung_core::model::Mode;

const DEFAULT_TITLE: &str = "Uebung";

const ANALYSIS_REQUEST: &str = "Please analyze my results.

First:
- Summarize what I did well.
- If many sentences are correct, describe them as my strong side.

Then write: BUT

After BUT:
- Look at my mistakes.
- Find patterns (same type of mistake).
- Group similar mistakes together.
- Explain each mistake type only once.
- If a mistake appears many times, say that I should pay special attention to it.
- If mistakes are different (different grammar topics), explain each one briefly.

Do not analyze every sentence separately if the mistakes are the same.

For each mistake type:
- Explain the problem in very simple German (A2)
- Give the correct rule (short)
- Give one simple example

At the end:
- What grammar I should practice now
- Simple tips for learning

Important:
- Write only in very easy German (A2 level)
- Use short sentences
- Be positive and encouraging
- Do not overthink or invent complex linguistic analysis";

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() { placeholder } else { value }
}

/// Results report for one evaluation; rendered through `Display`.
struct Report<'a> {
    title: &'a str,
    mode: Mode,
    evaluation: &'a Evaluation,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.title;
        writeln!(f, "Test: {title}")?;
        writeln!(f, "Mode: {}", self.mode)?;
        writeln!(f)?;

        for group in &self.evaluation.groups {
            writeln!(f, "{}:", group.label)?;
            writeln!(
                f,
                "Sentence: {}",
                or_placeholder(&group.source_text, "(kein Satz gefunden)")
            )?;
            for field in &group.fields {
                writeln!(
                    f,
                    "{} | Your answer: {} | Correct: {} | Result: {}",
                    field.label,
                    or_placeholder(&field.actual, "(empty)"),
                    or_placeholder(&field.expected, "(empty)"),
                    if field.correct { "correct" } else { "wrong" },
                )?;
            }
            writeln!(f)?;
        }

        let score = self.evaluation.score;
        let percent = score.percent();
        writeln!(f, "Score: {score}")?;
        writeln!(f, "Accuracy: {percent}%")?;
        write!(
            f,
            "Prompt: I have completed a German test: {title}.\n\nMy score is {score} ({percent}%).\n\n{ANALYSIS_REQUEST}"
        )
    }
}

/// Render the report for one evaluation.
#[must_use]
pub fn results_text(title: &str, mode: Mode, evaluation: &Evaluation) -> String {
    Report {
        title: or_placeholder(title.trim(), DEFAULT_TITLE),
        mode,
        evaluation,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use uebung_core::model::{
        BlockDefinition, ExerciseDefinition, FieldId, Page, PartDefinition as P,
    };
    use uebung_core::{MatchPolicy, evaluate, group_fields};

    #[test]
    fn report_lists_groups_and_score() {
        let mut page = Page::from_definition(&ExerciseDefinition {
            title: "Perfekt".into(),
            path: String::new(),
            blocks: vec![
                BlockDefinition::sentence(vec![
                    P::text("Ich bin (gehen) nach Hause "),
                    P::blank("gegangen"),
                    P::text("."),
                ]),
                BlockDefinition::blank("war"),
            ],
        })
        .unwrap();
        page.set_text(FieldId::new(0), "gegangen");
        let groups = group_fields(&page);
        let evaluation = evaluate(&page, &groups, MatchPolicy::Hard);

        let text = results_text("Perfekt", Mode::Hard, &evaluation);
        let head: Vec<&str> = text.lines().take(11).collect();
        assert_eq!(
            head,
            vec![
                "Test: Perfekt",
                "Mode: hard",
                "",
                "Item 1:",
                "Sentence: Ich bin nach Hause gegangen.",
                "Teil 1 | Your answer: gegangen | Correct: gegangen | Result: correct",
                "",
                "Item 2:",
                "Sentence: (kein Satz gefunden)",
                "Teil 1 | Your answer: (empty) | Correct: war | Result: wrong",
                "",
            ]
        );
        assert!(text.contains("Score: 1/2\nAccuracy: 50%\n"));
        assert!(text.contains("Prompt: I have completed a German test: Perfekt.\n\nMy score is 1/2 (50%)."));
        assert!(text.ends_with("Do not overthink or invent complex linguistic analysis"));
    }

    #[test]
    fn blank_title_falls_back() {
        let page = Page::from_definition(&ExerciseDefinition {
            title: String::new(),
            path: String::new(),
            blocks: vec![BlockDefinition::blank("war")],
        })
        .unwrap();
        let groups = group_fields(&page);
        let evaluation = evaluate(&page, &groups, MatchPolicy::Soft);
        let text = results_text("  ", Mode::Soft, &evaluation);
        assert!(text.starts_with("Test: Uebung\nMode: soft\n"));
    }
}
