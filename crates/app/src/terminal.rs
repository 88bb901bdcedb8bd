//! Line-oriented presentation layer.
//!
//! Reads commands from any `BufRead` and renders to any `Write`, so the whole
//! review loop runs the same against stdin/stdout and in tests.

use std::io::{self, BufRead, Write};

use flashcard_core::model::{
    ModuleName, ProgressRecord, TagFilter, TagName, default_vocabulary,
};
use services::{
    CountBounds, ModuleError, ModuleService, ModuleStats, ReviewSession, SessionError,
    SessionLoopService,
};
use tracing::{debug, warn};

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Choices already made on the command line; missing ones are prompted for.
#[derive(Debug, Clone, Default)]
pub struct ReviewOptions {
    pub module: Option<ModuleName>,
    pub filter: Option<TagFilter>,
    pub count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CardCommand {
    Reveal,
    Correct,
    Incorrect,
    Tags(Vec<TagName>),
    Next,
    Previous,
    Save,
    Summary,
    NewSet,
    Help,
    Quit,
}

/// How the user left an active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetEnd {
    Quit,
    NewSet,
}

fn parse_command(line: &str, vocabulary: &[TagName]) -> Result<CardCommand, String> {
    let line = line.trim();
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
    let command = match head {
        "" | "r" => CardCommand::Reveal,
        "c" => CardCommand::Correct,
        "i" | "x" => CardCommand::Incorrect,
        "t" => CardCommand::Tags(parse_tags(rest, vocabulary)?),
        "n" => CardCommand::Next,
        "p" => CardCommand::Previous,
        "w" => CardCommand::Save,
        "s" => CardCommand::Summary,
        "g" => CardCommand::NewSet,
        "?" | "h" => CardCommand::Help,
        "q" => CardCommand::Quit,
        other => return Err(format!("unknown command `{other}`")),
    };
    Ok(command)
}

/// Tags by 1-based vocabulary number or by name, comma separated.
fn parse_tags(raw: &str, vocabulary: &[TagName]) -> Result<Vec<TagName>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| pick(part, vocabulary).ok_or_else(|| format!("unknown tag `{part}`")))
        .collect()
}

/// Resolve a menu answer given as a 1-based number or an exact (case-insensitive) label.
fn pick<T: Clone + std::fmt::Display>(answer: &str, options: &[T]) -> Option<T> {
    let answer = answer.trim();
    if let Ok(n) = answer.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i)).cloned();
    }
    options
        .iter()
        .find(|o| o.to_string().eq_ignore_ascii_case(answer))
        .cloned()
}

fn count_of(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

fn describe(record: &ProgressRecord) -> String {
    let tags = if record.tags().is_empty() {
        "none".to_string()
    } else {
        record
            .tags()
            .iter()
            .map(TagName::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "correct {} / incorrect {}, tags: {tags}",
        record.correct(),
        record.incorrect()
    )
}

pub struct Terminal<R, W> {
    input: R,
    out: W,
    vocabulary: Vec<TagName>,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self {
            input,
            out,
            vocabulary: default_vocabulary(),
        }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.out
    }

    /// Print `text` and read one line. `None` at end of input.
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.out, "{text}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Module names, or `None` after telling the user there are none.
    fn discover(&mut self, modules: &ModuleService) -> AppResult<Option<Vec<ModuleName>>> {
        match modules.list_modules() {
            Ok(names) => Ok(Some(names)),
            Err(err @ ModuleError::NoModules { .. }) => {
                writeln!(self.out, "warning: {err}")?;
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn list_modules(&mut self, modules: &ModuleService) -> AppResult<()> {
        if let Some(names) = self.discover(modules)? {
            for name in names {
                writeln!(self.out, "{name}")?;
            }
        }
        Ok(())
    }

    pub fn stats(&mut self, modules: &ModuleService, only: Option<&ModuleName>) -> AppResult<()> {
        let names = match only {
            Some(name) => vec![name.clone()],
            None => match self.discover(modules)? {
                Some(names) => names,
                None => return Ok(()),
            },
        };

        // A malformed progress file only spoils its own module's line.
        for name in &names {
            match modules.module_stats(name) {
                Ok(stats) => self.print_stats(&stats)?,
                Err(err) => {
                    warn!(module = %name, error = %err, "module stats unavailable");
                    writeln!(self.out, "{name}: error: {err}")?;
                }
            }
        }
        Ok(())
    }

    fn print_stats(&mut self, stats: &ModuleStats) -> io::Result<()> {
        let accuracy = stats
            .accuracy()
            .map_or_else(|| "-".to_string(), |a| format!("{:.0}%", a * 100.0));
        writeln!(
            self.out,
            "{}: {}, {} attempted, correct {} / incorrect {} ({accuracy})",
            stats.module,
            count_of(stats.questions, "question"),
            stats.attempted,
            stats.correct,
            stats.incorrect
        )?;
        for (tag, count) in &stats.tag_counts {
            writeln!(self.out, "  {tag}: {count}")?;
        }
        Ok(())
    }

    pub fn review(
        &mut self,
        modules: &ModuleService,
        session_loop: &SessionLoopService,
        options: &ReviewOptions,
    ) -> AppResult<()> {
        let Some(names) = self.discover(modules)? else {
            return Ok(());
        };

        let module = match &options.module {
            Some(module) => module.clone(),
            None => match self.choose_module(&names)? {
                Some(module) => module,
                None => return Ok(()),
            },
        };
        let selection = modules.open_module(&module)?;

        let filter = match &options.filter {
            Some(filter) => filter.clone(),
            None => match self.choose_filter()? {
                Some(filter) => filter,
                None => return Ok(()),
            },
        };

        let Some(bounds) = selection.count_bounds(&filter) else {
            writeln!(self.out, "No questions in {module} match the filter {filter}.")?;
            return Ok(());
        };
        let count = match options.count {
            Some(count) => bounds.clamp(count),
            None => match self.choose_count(bounds)? {
                Some(count) => count,
                None => return Ok(()),
            },
        };

        let mut session = session_loop.start_session(selection, filter.clone(), count)?;
        loop {
            let end = self.drive(session_loop, &mut session)?;
            self.finish(session_loop, &mut session)?;
            if end == SetEnd::Quit {
                return Ok(());
            }
            // The next draw sees every change made during the previous set.
            match session_loop.start_session(session.into_selection(), filter.clone(), count) {
                Ok(next) => session = next,
                Err(SessionError::Empty) => {
                    writeln!(self.out, "No questions in {module} match the filter {filter} anymore.")?;
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn choose_module(&mut self, names: &[ModuleName]) -> AppResult<Option<ModuleName>> {
        for (i, name) in names.iter().enumerate() {
            writeln!(self.out, "{}. {name}", i + 1)?;
        }
        loop {
            let Some(answer) = self.prompt("Choose a module: ")? else {
                return Ok(None);
            };
            if let Some(name) = pick(&answer, names) {
                return Ok(Some(name));
            }
            writeln!(self.out, "No module `{answer}`.")?;
        }
    }

    fn choose_filter(&mut self) -> AppResult<Option<TagFilter>> {
        let mut options = vec![TagFilter::All];
        options.extend(self.vocabulary.iter().cloned().map(TagFilter::Tag));
        for (i, option) in options.iter().enumerate() {
            writeln!(self.out, "{}. {option}", i + 1)?;
        }
        loop {
            let Some(answer) = self.prompt("Filter by tag [All]: ")? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(Some(TagFilter::All));
            }
            if let Some(filter) = pick(&answer, &options) {
                return Ok(Some(filter));
            }
            writeln!(self.out, "No filter `{answer}`.")?;
        }
    }

    fn choose_count(&mut self, bounds: CountBounds) -> AppResult<Option<usize>> {
        let default = bounds.default_count();
        let text = format!(
            "How many questions? ({}-{}) [{default}]: ",
            bounds.min(),
            bounds.max()
        );
        loop {
            let Some(answer) = self.prompt(&text)? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(Some(default));
            }
            match answer.parse::<usize>() {
                Ok(n) if (bounds.min()..=bounds.max()).contains(&n) => return Ok(Some(n)),
                _ => writeln!(self.out, "Enter a number between {} and {}.", bounds.min(), bounds.max())?,
            }
        }
    }

    fn print_help(&mut self) -> io::Result<()> {
        writeln!(self.out, "  r or Enter  show the answer")?;
        writeln!(self.out, "  c / i       mark correct / incorrect")?;
        writeln!(self.out, "  t 1,3       set tags by number or name (`t` alone clears)")?;
        for (i, tag) in self.vocabulary.iter().enumerate() {
            writeln!(self.out, "              {}. {tag}", i + 1)?;
        }
        writeln!(self.out, "  n / p       next / previous question")?;
        writeln!(self.out, "  s           session summary")?;
        writeln!(self.out, "  g           draw a new set with the same filter")?;
        writeln!(self.out, "  w           retry saving progress")?;
        writeln!(self.out, "  q           quit")
    }

    fn show_card(&mut self, session: &ReviewSession, index: usize) -> io::Result<()> {
        let card = &session.cards()[index];
        writeln!(self.out, "---- [{}/{}] ----", index + 1, session.len())?;
        writeln!(self.out, "Q: {}", card.pair().question())?;
        if let Some(answer) = card.visible_answer() {
            writeln!(self.out, "A: {answer}")?;
        }
        if let Some(record) = session.record(card.id()) {
            writeln!(self.out, "   ({})", describe(record))?;
        }
        Ok(())
    }

    fn drive(
        &mut self,
        session_loop: &SessionLoopService,
        session: &mut ReviewSession,
    ) -> AppResult<SetEnd> {
        writeln!(
            self.out,
            "{} from {}. Type ? for help.",
            count_of(session.len(), "question"),
            session.module()
        )?;
        let mut index = 0;
        self.show_card(session, index)?;

        loop {
            let Some(line) = self.prompt("> ")? else {
                return Ok(SetEnd::Quit);
            };
            let command = match parse_command(&line, &self.vocabulary) {
                Ok(command) => command,
                Err(message) => {
                    writeln!(self.out, "{message}; type ? for help")?;
                    continue;
                }
            };
            debug!(?command, index, "card command");

            let id = session.cards()[index].id().clone();
            let outcome = match command {
                CardCommand::Reveal => {
                    if let Some(answer) = session.reveal(&id)?.visible_answer() {
                        writeln!(self.out, "A: {answer}")?;
                    }
                    continue;
                }
                CardCommand::Correct => session_loop.mark_correct(session, &id),
                CardCommand::Incorrect => session_loop.mark_incorrect(session, &id),
                CardCommand::Tags(tags) => session_loop.set_tags(session, &id, tags),
                CardCommand::Next => {
                    if index + 1 == session.len() {
                        return Ok(SetEnd::Quit);
                    }
                    index += 1;
                    self.show_card(session, index)?;
                    continue;
                }
                CardCommand::Previous => {
                    index = index.saturating_sub(1);
                    self.show_card(session, index)?;
                    continue;
                }
                CardCommand::Save => {
                    match session_loop.flush(session) {
                        Ok(()) => writeln!(self.out, "Progress saved.")?,
                        Err(err) => self.report_error(err)?,
                    }
                    continue;
                }
                CardCommand::Summary => {
                    self.print_summary(session)?;
                    continue;
                }
                CardCommand::Help => {
                    self.print_help()?;
                    continue;
                }
                CardCommand::NewSet => return Ok(SetEnd::NewSet),
                CardCommand::Quit => return Ok(SetEnd::Quit),
            };

            match outcome {
                Ok(record) => writeln!(self.out, "   ({})", describe(&record))?,
                Err(err) => self.report_error(err)?,
            }
        }
    }

    /// Unsaved progress is a warning: the review goes on with the in-memory state.
    fn report_error(&mut self, err: SessionError) -> AppResult<()> {
        if err.is_unsaved() {
            writeln!(self.out, "warning: {err}")?;
            writeln!(self.out, "Your answers are kept for this session; type w to retry.")?;
            return Ok(());
        }
        Err(err.into())
    }

    fn print_summary(&mut self, session: &ReviewSession) -> io::Result<()> {
        let progress = session.progress();
        writeln!(
            self.out,
            "{}, {} revealed, {} correct, {} incorrect, {} untouched",
            count_of(progress.total, "question"),
            progress.revealed,
            progress.marked_correct,
            progress.marked_incorrect,
            progress.untouched
        )
    }

    fn finish(
        &mut self,
        session_loop: &SessionLoopService,
        session: &mut ReviewSession,
    ) -> AppResult<()> {
        if let Err(err) = session_loop.flush(session) {
            self.report_error(err)?;
        }
        self.print_summary(session)?;
        Ok(())
    }
}
