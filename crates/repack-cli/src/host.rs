use std::process::Command;

use repack_core::ProjectRecord;
use repack_engine::BuildHost;

use crate::config::BuildCommands;

pub struct CommandHost {
    commands: BuildCommands,
}

impl CommandHost {
    pub fn new(commands: BuildCommands) -> Self {
        Self { commands }
    }

    fn run(command: &str) -> bool {
        match shell(command).status() {
            Ok(status) => status.success(),
            Err(_) => false,
        }
    }
}

impl BuildHost for CommandHost {
    fn build_project(&mut self, project: &ProjectRecord) -> bool {
        Self::run(&expand_command(&self.commands.project, project))
    }

    fn build_solution(&mut self) -> bool {
        Self::run(&self.commands.solution)
    }

    fn clean_solution(&mut self) {
        let _ = Self::run(&self.commands.clean);
    }

    fn reopen_solution(&mut self) {
        if let Some(reopen) = self.commands.reopen.as_deref() {
            let _ = Self::run(reopen);
        }
    }
}

fn shell(command: &str) -> Command {
    if cfg!(windows) {
        let mut shell = Command::new("cmd");
        shell.args(["/C", command]);
        shell
    } else {
        let mut shell = Command::new("sh");
        shell.args(["-c", command]);
        shell
    }
}

pub fn expand_command(template: &str, project: &ProjectRecord) -> String {
    template
        .replace("{dir}", &project.directory.display().to_string())
        .replace("{name}", &project.name)
        .replace("{manifest}", &project.manifest_path.display().to_string())
}
