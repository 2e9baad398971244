use std::{fs, path::PathBuf};

use anyhow::Context as _;
use chrono::Utc;
use rfc_gate::{
    Strictness, Verdict, Workspace,
    storage::{RunState, SkillDir},
};
use tracing::instrument;

use super::terminal;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Document identifier, e.g. rfc-20260211-auth-model
    rfc_id: String,

    /// Document title
    title: String,

    /// The template the document skeleton is taken from
    ///
    /// Defaults to `references/rfc_template.md` in the skill directory.
    #[arg(long, short)]
    template: Option<PathBuf>,

    /// Skill directory holding the template and the run-state schema
    ///
    /// Looked up next to the binary, then in the working directory, if
    /// omitted.
    #[arg(long)]
    skill_dir: Option<PathBuf>,

    /// Strictness level (light, standard, full)
    #[arg(long, default_value = "standard")]
    strictness: Strictness,

    /// Directory the `.ohrfc/` workspace is created under
    #[arg(long, default_value = ".")]
    workspace_root: PathBuf,
}

impl Command {
    #[instrument(level = "debug", skip(self), fields(rfc_id = %self.rfc_id))]
    pub fn run(self) -> anyhow::Result<()> {
        let skill = self.skill()?;
        let template_path = self
            .template
            .clone()
            .or_else(|| skill.as_ref().map(SkillDir::template))
            .context("No template given and no skill directory found")?;
        let template = fs::read_to_string(&template_path)
            .with_context(|| format!("Failed to read template {}", template_path.display()))?;

        let state = RunState::new(&self.rfc_id, self.strictness, Utc::now());
        if let Some(skill) = &skill {
            for issue in skill.check_state(&state) {
                tracing::warn!("State validation issue: {issue}");
            }
        }

        let workspace = Workspace::create(&self.workspace_root, &state, &self.title, &template)?;
        let document = fs::read_to_string(workspace.document())?;

        println!(
            "{}",
            terminal::paint(
                &format!("INIT complete: {}/", workspace.path().display()),
                Some(Verdict::Pass)
            )
        );
        println!("  strictness: {}", self.strictness);
        println!("  rfc.md: skeleton with {} lines", document.lines().count());
        println!("  evidence.json: initialized (0 items)");
        println!("  state.json: current_phase={}", state.current_phase);
        println!("{}", terminal::dim("  Ready for DISCOVER phase"));

        Ok(())
    }

    /// The skill directory. An explicit `--skill-dir` must exist; otherwise
    /// discovery is only required when there is no `--template`.
    fn skill(&self) -> anyhow::Result<Option<SkillDir>> {
        match (&self.skill_dir, &self.template) {
            (Some(dir), _) => Ok(Some(SkillDir::at(dir)?)),
            (None, None) => Ok(Some(SkillDir::discover()?)),
            (None, Some(_)) => Ok(SkillDir::discover().ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::TempDir;

    use super::*;

    fn parse(args: &[&str]) -> Command {
        Command::try_parse_from(std::iter::once("init").chain(args.iter().copied())).unwrap()
    }

    fn skill_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("references")).unwrap();
        fs::write(
            dir.path().join("references/rfc_template.md"),
            "# Guide\n# RFC-YYYYMMDD：<标题>\n## 1. 背景\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn takes_the_template_from_the_skill_directory() {
        let skill = skill_dir();
        let root = TempDir::new().unwrap();
        let skill_arg = skill.path().to_str().unwrap();
        let root_arg = root.path().to_str().unwrap();

        parse(&["rfc-20260211-demo", "Demo", "--skill-dir", skill_arg, "--workspace-root", root_arg])
            .run()
            .unwrap();

        let text = fs::read_to_string(Workspace::at(root.path(), "rfc-20260211-demo").document()).unwrap();
        assert!(text.contains("# RFC-20260211：Demo\n## 1. 背景\n"));
    }

    #[test]
    fn an_explicit_skill_directory_must_hold_a_template() {
        let empty = TempDir::new().unwrap();
        let command = parse(&["rfc-demo", "Demo", "--skill-dir", empty.path().to_str().unwrap()]);
        assert!(command.skill().is_err());
    }
}
