//! Trust gate run before every install.
//!
//! Checks run in a fixed order and the first match wins:
//!
//! 1. the caller asked to skip confirmation,
//! 2. the bundle belongs to the authenticated user,
//! 3. the bundle's owner is in the trust store,
//! 4. otherwise the user is prompted.
//!
//! The prompt is a small state machine: `view` redraws the full bundle and asks
//! again, every other answer is final.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::bundler::codec;
use crate::core::frontmatter;
use crate::core::registry::InstallPlan;
use crate::core::trust::{TrustStore, same_handle};
use crate::error::Result;
use crate::providers::{Provider, SnippetBundle};

/// Extensions flagged as executable scripts in the prompt's file listing.
pub const DEFAULT_SCRIPT_EXTENSIONS: &[&str] =
    &[".sh", ".bash", ".zsh", ".py", ".rb", ".pl", ".js", ".ts"];

/// Body lines of the primary document shown before the user asks for more.
pub const DEFAULT_PREVIEW_LINES: usize = 20;

/// Final state of one gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    Bypass,
    SelfAuthored,
    AlreadyTrusted,
    InstallOnce,
    InstallAndTrustAuthor,
    Aborted,
}

impl GateOutcome {
    /// Whether the install may go ahead.
    #[must_use]
    pub const fn proceeds(self) -> bool {
        !matches!(self, Self::Aborted)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bypass => "bypass",
            Self::SelfAuthored => "self_authored",
            Self::AlreadyTrusted => "already_trusted",
            Self::InstallOnce => "install_once",
            Self::InstallAndTrustAuthor => "install_and_trust_author",
            Self::Aborted => "aborted",
        }
    }
}

/// One line of prompt input, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptInput {
    Install,
    TrustAuthor,
    View,
    Other,
}

impl PromptInput {
    fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Self::Install,
            "trust-author" | "trust" => Self::TrustAuthor,
            "v" | "view" => Self::View,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Decide(GateOutcome),
    ShowAll,
}

/// Transition table for the prompt state.
const fn transition(input: PromptInput) -> Transition {
    match input {
        PromptInput::Install => Transition::Decide(GateOutcome::InstallOnce),
        PromptInput::TrustAuthor => Transition::Decide(GateOutcome::InstallAndTrustAuthor),
        PromptInput::View => Transition::ShowAll,
        PromptInput::Other => Transition::Decide(GateOutcome::Aborted),
    }
}

pub struct TrustGate {
    store_path: PathBuf,
    /// Loaded on first use, so the first two checks never touch disk.
    store: Option<TrustStore>,
    bypass: bool,
    preview_lines: usize,
    script_extensions: Vec<String>,
}

impl TrustGate {
    /// A gate backed by the trust store at `store_path`.
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            store: None,
            bypass: false,
            preview_lines: DEFAULT_PREVIEW_LINES,
            script_extensions: DEFAULT_SCRIPT_EXTENSIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Use an already loaded store instead of reading `store_path`.
    #[must_use]
    pub fn with_store(mut self, store: TrustStore) -> Self {
        self.store_path = store.path().to_path_buf();
        self.store = Some(store);
        self
    }

    #[must_use]
    pub const fn bypass(mut self, bypass: bool) -> Self {
        self.bypass = bypass;
        self
    }

    #[must_use]
    pub const fn preview_lines(mut self, lines: usize) -> Self {
        self.preview_lines = lines;
        self
    }

    #[must_use]
    pub fn script_extensions(mut self, extensions: &[String]) -> Self {
        self.script_extensions = extensions.iter().map(|ext| ext.to_ascii_lowercase()).collect();
        self
    }

    /// Decide whether `bundle` may be installed.
    ///
    /// `input` is only read when a prompt is needed, and the trust store is
    /// only read once the first two checks have passed. Choosing to trust the
    /// author saves the trust store before returning; a failed save is an
    /// error and the install must not continue.
    pub fn decide<R: BufRead, W: Write>(
        &mut self,
        bundle: &SnippetBundle,
        plan: &InstallPlan<'_>,
        provider: &dyn Provider,
        input: &mut R,
        out: &mut W,
    ) -> Result<GateOutcome> {
        let owner = bundle.owner();

        if self.bypass {
            debug!(bundle = %bundle.id, "trust prompt bypassed");
            return Ok(GateOutcome::Bypass);
        }

        let me = provider.authenticated_user();
        if !me.is_empty() && same_handle(&me, owner) {
            debug!(bundle = %bundle.id, author = owner, "bundle is self-authored");
            return Ok(GateOutcome::SelfAuthored);
        }

        if self.store()?.is_trusted(owner) {
            debug!(bundle = %bundle.id, author = owner, "author is trusted");
            return Ok(GateOutcome::AlreadyTrusted);
        }

        self.render_summary(bundle, plan, out)?;
        let outcome = loop {
            write!(out, "  [y] Install  [trust-author] Trust all from this author  [v] View all  [N] Abort\n  > ")?;
            out.flush()?;

            let mut line = String::new();
            let read = input.read_line(&mut line)?;
            let answer = if read == 0 {
                PromptInput::Other
            } else {
                PromptInput::parse(&line)
            };

            match transition(answer) {
                Transition::Decide(outcome) => break outcome,
                Transition::ShowAll => self.render_all(bundle, out)?,
            }
        };

        if outcome == GateOutcome::InstallAndTrustAuthor {
            let store = self.store()?;
            store.add_author(owner);
            store.save()?;
            info!(author = owner, "trusted author");
        }
        debug!(bundle = %bundle.id, outcome = outcome.as_str(), "trust prompt answered");
        Ok(outcome)
    }

    fn store(&mut self) -> Result<&mut TrustStore> {
        let store = match self.store.take() {
            Some(store) => store,
            None => TrustStore::load(&self.store_path)?,
        };
        Ok(self.store.insert(store))
    }

    fn is_script(&self, path: &str) -> bool {
        let lower = path.to_ascii_lowercase();
        self.script_extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }

    fn render_summary<W: Write>(
        &self,
        bundle: &SnippetBundle,
        plan: &InstallPlan<'_>,
        out: &mut W,
    ) -> Result<()> {
        writeln!(out)?;
        writeln!(out, "  Install skill?")?;
        writeln!(out, "  Name:   {}", plan.name)?;
        writeln!(out, "  Author: {}", bundle.owner())?;
        writeln!(out, "  URL:    {}", bundle.html_url)?;
        writeln!(out)?;
        writeln!(out, "  Files:")?;

        let mut paths: Vec<String> = bundle.files.keys().map(|key| codec::expand(key)).collect();
        paths.sort();
        let mut scripts = 0;
        for path in &paths {
            if self.is_script(path) {
                scripts += 1;
                writeln!(out, "    {path} [script]")?;
            } else {
                writeln!(out, "    {path}")?;
            }
        }
        if scripts > 0 {
            writeln!(out)?;
            writeln!(out, "  Contains {scripts} script(s), review before running")?;
        }

        writeln!(out)?;
        writeln!(out, "  -- {} preview --", plan.primary_key)?;
        let lines: Vec<&str> = frontmatter::body(&plan.primary.content).lines().collect();
        for line in lines.iter().take(self.preview_lines) {
            writeln!(out, "  | {line}")?;
        }
        if lines.len() > self.preview_lines {
            writeln!(out, "  | ... ({} more lines)", lines.len() - self.preview_lines)?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn render_all<W: Write>(&self, bundle: &SnippetBundle, out: &mut W) -> Result<()> {
        writeln!(out)?;
        for (key, file) in &bundle.files {
            writeln!(out, "  == {} ==", codec::expand(key))?;
            for line in file.content.lines() {
                writeln!(out, "  | {line}")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::trust::TRUST_STORE_FILE;
    use crate::error::SkillError;
    use crate::test_utils::{MockProvider, bundle, weather_bundle};
    use std::io::{Cursor, Read};
    use std::path::Path;

    /// Reader that fails the test if anything tries to read from it.
    struct NoInput;

    impl Read for NoInput {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            panic!("gate read input when it should not have");
        }
    }

    impl BufRead for NoInput {
        fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
            panic!("gate read input when it should not have");
        }

        fn consume(&mut self, _: usize) {}
    }

    fn store_path() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TRUST_STORE_FILE);
        (dir, path)
    }

    fn run(path: &Path, provider: &MockProvider, answers: &str) -> (GateOutcome, String) {
        let bundle = weather_bundle();
        let plan = InstallPlan::new(&bundle).unwrap();
        let mut out = Vec::new();
        let outcome = TrustGate::new(path)
            .decide(&bundle, &plan, provider, &mut Cursor::new(answers.as_bytes()), &mut out)
            .unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn parses_prompt_answers() {
        assert_eq!(PromptInput::parse("y\n"), PromptInput::Install);
        assert_eq!(PromptInput::parse(" YES "), PromptInput::Install);
        assert_eq!(PromptInput::parse("trust-author"), PromptInput::TrustAuthor);
        assert_eq!(PromptInput::parse("Trust"), PromptInput::TrustAuthor);
        assert_eq!(PromptInput::parse("v"), PromptInput::View);
        assert_eq!(PromptInput::parse(""), PromptInput::Other);
        assert_eq!(PromptInput::parse("n"), PromptInput::Other);
        assert_eq!(PromptInput::parse("maybe"), PromptInput::Other);
    }

    #[test]
    fn bypass_never_reads_input() {
        let (_dir, path) = store_path();
        let bundle = weather_bundle();
        let plan = InstallPlan::new(&bundle).unwrap();
        let provider = MockProvider::new();
        let mut out = Vec::new();

        let outcome = TrustGate::new(&path)
            .bypass(true)
            .decide(&bundle, &plan, &provider, &mut NoInput, &mut out)
            .unwrap();

        assert_eq!(outcome, GateOutcome::Bypass);
        assert!(outcome.proceeds());
        assert!(out.is_empty());
    }

    #[test]
    fn self_authored_skips_prompt() {
        let (_dir, path) = store_path();
        let bundle = weather_bundle();
        let plan = InstallPlan::new(&bundle).unwrap();
        let provider = MockProvider::new().with_user("NICO");

        let outcome = TrustGate::new(&path)
            .decide(&bundle, &plan, &provider, &mut NoInput, &mut Vec::new())
            .unwrap();
        assert_eq!(outcome, GateOutcome::SelfAuthored);
    }

    #[test]
    fn trusted_author_skips_prompt() {
        let (_dir, path) = store_path();
        let mut store = TrustStore::load(&path).unwrap();
        store.add_author("Nico");
        let bundle = weather_bundle();
        let plan = InstallPlan::new(&bundle).unwrap();

        let outcome = TrustGate::new(&path)
            .with_store(store)
            .decide(&bundle, &plan, &MockProvider::new(), &mut NoInput, &mut Vec::new())
            .unwrap();
        assert_eq!(outcome, GateOutcome::AlreadyTrusted);
    }

    #[test]
    fn empty_authenticated_user_is_not_self() {
        let (_dir, path) = store_path();
        let b = bundle("anon", "", &[("x.skill.md", "body")]);
        let plan = InstallPlan::new(&b).unwrap();
        let provider = MockProvider::new().with_user("");

        let outcome = TrustGate::new(&path)
            .decide(&b, &plan, &provider, &mut Cursor::new(b"\n".as_slice()), &mut Vec::new())
            .unwrap();
        assert_eq!(outcome, GateOutcome::Aborted);
    }

    #[test]
    fn prompt_answers() {
        let provider = MockProvider::new();
        for (answer, expected) in [
            ("y\n", GateOutcome::InstallOnce),
            ("yes\n", GateOutcome::InstallOnce),
            ("n\n", GateOutcome::Aborted),
            ("\n", GateOutcome::Aborted),
            ("", GateOutcome::Aborted),
            ("whatever\n", GateOutcome::Aborted),
        ] {
            let (_dir, path) = store_path();
            let (outcome, _) = run(&path, &provider, answer);
            assert_eq!(outcome, expected, "answer {answer:?}");
            assert!(!path.exists());
        }
    }

    #[test]
    fn prompt_shows_summary_and_flags_scripts() {
        let (_dir, path) = store_path();
        let (_, out) = run(&path, &MockProvider::new(), "n\n");
        assert!(out.contains("Name:   weather"));
        assert!(out.contains("Author: nico"));
        assert!(out.contains("scripts/run.sh [script]"));
        assert!(out.contains("weather.skill.md\n"));
        assert!(out.contains("| # Weather"));
        assert!(!out.contains("name: weather"));
    }

    #[test]
    fn preview_is_bounded() {
        let (_dir, path) = store_path();
        let body: String = (1..=30).map(|n| format!("line {n}\n")).collect();
        let b = bundle("long", "amy", &[("long.skill.md", &body)]);
        let plan = InstallPlan::new(&b).unwrap();
        let mut out = Vec::new();
        TrustGate::new(&path)
            .preview_lines(5)
            .decide(&b, &plan, &MockProvider::new(), &mut Cursor::new(b"n\n".as_slice()), &mut out)
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("| line 5\n"));
        assert!(!out.contains("| line 6\n"));
        assert!(out.contains("... (25 more lines)"));
    }

    #[test]
    fn view_is_a_self_loop() {
        let (_dir, path) = store_path();
        let (outcome, out) = run(&path, &MockProvider::new(), "v\nview\ny\n");
        assert_eq!(outcome, GateOutcome::InstallOnce);
        assert_eq!(out.matches("== scripts/run.sh ==").count(), 2);
        assert!(out.contains("| echo hi"));
    }

    #[test]
    fn trust_author_persists_before_returning() {
        let (_dir, path) = store_path();
        let (outcome, _) = run(&path, &MockProvider::new(), "trust-author\n");
        assert_eq!(outcome, GateOutcome::InstallAndTrustAuthor);
        assert!(TrustStore::load(&path).unwrap().is_trusted("nico"));

        let bundle = weather_bundle();
        let plan = InstallPlan::new(&bundle).unwrap();
        let again = TrustGate::new(&path)
            .decide(&bundle, &plan, &MockProvider::new(), &mut NoInput, &mut Vec::new())
            .unwrap();
        assert_eq!(again, GateOutcome::AlreadyTrusted);
    }

    #[test]
    fn trust_save_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        let store = TrustStore::load(blocker.join(TRUST_STORE_FILE)).unwrap();
        std::fs::write(&blocker, "file").unwrap();

        let bundle = weather_bundle();
        let plan = InstallPlan::new(&bundle).unwrap();
        let err = TrustGate::new(&blocker)
            .with_store(store)
            .decide(
                &bundle,
                &plan,
                &MockProvider::new(),
                &mut Cursor::new(b"trust\n".as_slice()),
                &mut Vec::new(),
            )
            .unwrap_err();
        assert!(matches!(err, SkillError::Filesystem { .. } | SkillError::Io(_)));
    }

    #[test]
    fn earlier_checks_do_not_read_trust_store() {
        let (_dir, path) = store_path();
        std::fs::write(&path, "{corrupt").unwrap();
        let bundle = weather_bundle();
        let plan = InstallPlan::new(&bundle).unwrap();

        let bypassed = TrustGate::new(&path)
            .bypass(true)
            .decide(&bundle, &plan, &MockProvider::new(), &mut NoInput, &mut Vec::new())
            .unwrap();
        assert_eq!(bypassed, GateOutcome::Bypass);

        let own = TrustGate::new(&path)
            .decide(&bundle, &plan, &MockProvider::new().with_user("nico"), &mut NoInput, &mut Vec::new())
            .unwrap();
        assert_eq!(own, GateOutcome::SelfAuthored);

        let err = TrustGate::new(&path)
            .decide(&bundle, &plan, &MockProvider::new(), &mut NoInput, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, SkillError::Serialization(_)));
    }
}
