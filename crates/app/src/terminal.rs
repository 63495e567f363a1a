//! Line-oriented terminal front end for one exercise page.

use std::io::{self, BufRead, Write};

use services::{CheckOutcome, ExerciseWorkflow, ForwardAction, SaveStatus};
use uebung_core::input::{Direction, Key, KeyEvent};
use uebung_core::model::{FieldId, FieldValue, Inline, Mode};
use uebung_core::{Evaluation, Group, ItemStatus};

const INCOMPLETE_WARNING: &str =
    "Du hast noch leere Felder. Bitte fuelle alles aus, um deine Leistung zu pruefen.";

/// One line typed by the learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `<field> <answer>`; field numbers start at 1.
    Set { field: usize, value: String },
    /// Empty line: the forward key.
    Forward,
    Next,
    Previous,
    Goto(usize),
    Check,
    Report,
    Save(String),
    Mode(Mode),
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match head {
            "" => Self::Forward,
            "n" | "next" => Self::Next,
            "p" | "prev" => Self::Previous,
            "check" => Self::Check,
            "report" => Self::Report,
            "save" => Self::Save(rest.to_owned()),
            "help" | "?" => Self::Help,
            "q" | "quit" => Self::Quit,
            "goto" => rest
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map_or_else(|| Self::Unknown(line.to_owned()), |n| Self::Goto(n - 1)),
            "mode" => rest
                .parse::<Mode>()
                .map_or_else(|_| Self::Unknown(line.to_owned()), Self::Mode),
            _ => match head.parse::<usize>() {
                Ok(n) if n > 0 => Self::Set {
                    field: n - 1,
                    value: expand_shortcuts(rest),
                },
                _ => Self::Unknown(line.to_owned()),
            },
        }
    }
}

/// Replace `\1` .. `\4` with the special characters of the digit shortcuts.
#[must_use]
pub fn expand_shortcuts(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(special) = chars
                .peek()
                .and_then(|next| KeyEvent::plain(Key::Char(*next)).special_char())
            {
                out.push(special);
                chars.next();
                continue;
            }
        }
        out.push(ch);
    }
    out
}

fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Befehle:")?;
    writeln!(out, "  <Nr> <Antwort>   Feld ausfuellen (\\1=ä \\2=ö \\3=ü \\4=ß)")?;
    writeln!(out, "  <Enter>          weiter, wenn der Satz vollstaendig ist")?;
    writeln!(out, "  n | p | goto <k> naechster / vorheriger / k-ter Satz")?;
    writeln!(out, "  check            pruefen")?;
    writeln!(out, "  report           Ergebnis als Text")?;
    writeln!(out, "  save <Name>      Versuch speichern")?;
    writeln!(out, "  mode soft|hard   Modus wechseln")?;
    writeln!(out, "  quit")
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn field_slot(wf: &ExerciseWorkflow, id: FieldId) -> String {
    let Some(field) = wf.page().field(id) else {
        return String::new();
    };
    let value = if field.actual().is_empty() { "___" } else { field.actual() };
    match field.value() {
        FieldValue::FreeText(_) => format!("[{}: {value}]", id.index() + 1),
        FieldValue::SingleChoice { options, .. } => {
            format!("[{}: {value} | {}]", id.index() + 1, options.join(" / "))
        }
    }
}

fn render_group(wf: &ExerciseWorkflow, group: &Group, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}:", group.label())?;
    let page = wf.page();
    let container = group
        .fields()
        .first()
        .and_then(|id| page.field(*id))
        .and_then(|f| f.container())
        .and_then(|c| page.container(c));
    match container {
        Some(container) => {
            let mut line = String::new();
            for inline in container.content() {
                match inline {
                    Inline::Text(text) => line.push_str(text),
                    Inline::Field(id) => line.push_str(&field_slot(wf, *id)),
                    Inline::Break => line.push_str(" / "),
                }
            }
            writeln!(out, "  {}", line.trim())
        }
        None => {
            for id in group.fields() {
                let label = page.field(*id).and_then(|f| f.label()).unwrap_or("");
                writeln!(out, "  {label} {}", field_slot(wf, *id).trim_start())?;
            }
            Ok(())
        }
    }
}

fn render_progress(wf: &ExerciseWorkflow, out: &mut impl Write) -> io::Result<()> {
    let session = wf.session();
    let bar: String = session
        .progress()
        .segments()
        .iter()
        .map(|s| match (s.active, s.status) {
            (true, _) => '>',
            (_, ItemStatus::Correct) => '+',
            (_, ItemStatus::Wrong) => 'x',
            (_, ItemStatus::Complete) => '#',
            (_, ItemStatus::Incomplete) => '-',
        })
        .collect();
    writeln!(
        out,
        "{} [{bar}] {}%",
        session.progress_label(),
        session.progress().percent()
    )
}

fn render_controls(wf: &ExerciseWorkflow, out: &mut impl Write) -> io::Result<()> {
    let Some(controls) = wf.session().controls() else {
        return Ok(());
    };
    let mut parts = Vec::new();
    if controls.previous_enabled {
        parts.push("[p] Vorheriger Satz".to_owned());
    }
    if controls.next_enabled {
        parts.push(format!("[n] {}", controls.next_label.as_str()));
    } else {
        parts.push(controls.next_label.as_str().to_owned());
    }
    if controls.check_visible && wf.accepts_input() {
        parts.push("[check] Überprüfen".to_owned());
    }
    writeln!(out, "{}", parts.join("  "))
}

pub fn render_page(wf: &ExerciseWorkflow, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "== {} ({}) ==", wf.page().title(), wf.mode())?;
    if wf.session().is_active() {
        render_progress(wf, out)?;
    }
    for group in wf.visible_groups() {
        render_group(wf, group, out)?;
    }
    render_controls(wf, out)
}

pub fn render_results(evaluation: &Evaluation, out: &mut impl Write) -> io::Result<()> {
    for group in &evaluation.groups {
        let verdict = if group.correct { "richtig" } else { "falsch" };
        writeln!(out, "{} ({verdict})", group.label)?;
        let sentence = if group.source_text.is_empty() {
            "(kein Satz gefunden)"
        } else {
            group.source_text.as_str()
        };
        writeln!(out, "  Satz: {sentence}")?;
        for field in &group.fields {
            let actual = if field.actual.is_empty() { "(leer)" } else { field.actual.as_str() };
            if field.correct {
                writeln!(out, "  {}: Deine Antwort: {actual} ist korrekt.", field.label)?;
            } else {
                writeln!(out, "  {}: Deine Antwort: {actual}", field.label)?;
                writeln!(out, "  {}: Korrekt: {}", field.label, field.expected)?;
            }
        }
    }
    writeln!(
        out,
        "Punkte: {} von {}",
        evaluation.score.correct, evaluation.score.total
    )
}

//
// ─── LOOP ──────────────────────────────────────────────────────────────────────
//

fn confirm(lines: &mut impl Iterator<Item = io::Result<String>>, out: &mut impl Write) -> io::Result<bool> {
    write!(out, "Wirklich pruefen? Danach sind die Antworten gesperrt. (j/n) ")?;
    out.flush()?;
    let answer = lines.next().transpose()?.unwrap_or_default();
    Ok(matches!(answer.trim(), "j" | "ja" | "y" | "yes"))
}

fn set_field(wf: &mut ExerciseWorkflow, index: usize, value: &str) -> bool {
    let id = FieldId::new(index);
    let Some(field) = wf.page().field(id) else {
        return false;
    };
    // Choices accept either the option text or its 1-based number.
    let option = match field.value() {
        FieldValue::FreeText(_) => None,
        FieldValue::SingleChoice { options, .. } => Some(
            value
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|n| options.get(n))
                .cloned()
                .unwrap_or_else(|| value.to_owned()),
        ),
    };
    match option {
        Some(option) => wf.select(id, &option),
        None => wf.set_text(id, value),
    }
}

/// Drive `wf` from `input` until `quit` or end of input.
pub async fn run_loop(
    wf: &mut ExerciseWorkflow,
    input: impl BufRead,
    out: &mut impl Write,
) -> io::Result<()> {
    let mut lines = input.lines();
    render_page(wf, out)?;
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        match Command::parse(&line) {
            Command::Quit => break,
            Command::Help => print_help(out)?,
            Command::Unknown(raw) => writeln!(out, "Unbekannter Befehl: {raw} (help fuer Hilfe)")?,
            Command::Set { field, value } => {
                if !set_field(wf, field, &value) {
                    writeln!(out, "Feld {} kann nicht geaendert werden.", field + 1)?;
                }
                render_page(wf, out)?;
            }
            Command::Forward => match wf.forward() {
                ForwardAction::Stay { focus } => {
                    if let Some(id) = focus {
                        writeln!(out, "Bitte zuerst Feld {} ausfuellen.", id.index() + 1)?;
                    }
                }
                ForwardAction::Advanced { .. } => render_page(wf, out)?,
                ForwardAction::FocusCheck => writeln!(out, "Letzter Satz: mit `check` pruefen.")?,
                ForwardAction::Ignored => {}
            },
            Command::Next => {
                if wf.navigate(Direction::Next) {
                    render_page(wf, out)?;
                }
            }
            Command::Previous => {
                if wf.navigate(Direction::Previous) {
                    render_page(wf, out)?;
                }
            }
            Command::Goto(index) => {
                if wf.jump(index) {
                    render_page(wf, out)?;
                }
            }
            Command::Check => {
                let gated = wf.session().is_active() && !wf.session().is_checked();
                if gated && wf.blocking_item().is_none() && !confirm(&mut lines, out)? {
                    continue;
                }
                match wf.check() {
                    CheckOutcome::Blocked { .. } => {
                        writeln!(out, "{INCOMPLETE_WARNING}")?;
                        render_page(wf, out)?;
                    }
                    CheckOutcome::Evaluated(evaluation) => {
                        render_results(&evaluation, out)?;
                        if wf.pending_draft().is_some() {
                            writeln!(out, "Mit `save <Name>` speichern.")?;
                        }
                    }
                    CheckOutcome::Inactive => {}
                }
            }
            Command::Report => match wf.report() {
                Some(text) => writeln!(out, "{text}")?,
                None => writeln!(out, "Noch kein Ergebnis.")?,
            },
            Command::Save(name) => {
                let status = wf.save_attempt(&name).await;
                writeln!(out, "{}", status.message())?;
                if let SaveStatus::Saved(id) = status {
                    writeln!(out, "Versuch {id} gespeichert.")?;
                }
            }
            Command::Mode(mode) => {
                wf.choose_mode(mode).await;
                render_page(wf, out)?;
            }
        }
    }
    Ok(())
}
