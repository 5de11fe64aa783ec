use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::{Desktop, PlatformError, Printer};

/// [`Desktop`] implemented with CUPS (`lpstat`, `lp`), `xdg-open`/`open`
/// and `zenity`.
#[derive(Debug, Default, Clone)]
pub struct SystemDesktop;

impl SystemDesktop {
    pub fn new() -> Self {
        Self
    }
}

fn run(command: &mut Command) -> Result<Output, PlatformError> {
    let name = format!("{:?}", command.get_program());
    command.output().map_err(|source| PlatformError::Spawn {
        command: name,
        source,
    })
}

fn check(command: &mut Command) -> Result<Output, PlatformError> {
    let name = format!("{:?}", command.get_program());
    let output = run(command)?;
    if !output.status.success() {
        return Err(PlatformError::Exit {
            command: name,
            code: output.status.code().unwrap_or(-1),
        });
    }
    Ok(output)
}

/// Parse `lpstat -p` output ("printer NAME is idle. ...").
pub fn parse_lpstat_printers(output: &str) -> Vec<Printer> {
    output
        .lines()
        .filter_map(|line| line.strip_prefix("printer "))
        .filter_map(|rest| rest.split_whitespace().next())
        .map(|name| Printer {
            device_id: name.to_string(),
            name: name.replace('_', " "),
        })
        .collect()
}

impl Desktop for SystemDesktop {
    fn list_printers(&self) -> Result<Vec<Printer>, PlatformError> {
        let output = check(Command::new("lpstat").arg("-p"))?;
        Ok(parse_lpstat_printers(&String::from_utf8_lossy(&output.stdout)))
    }

    fn print(&self, printer_id: &str, files: &[PathBuf]) -> Result<(), PlatformError> {
        if files.is_empty() {
            return Err(PlatformError::NothingToPrint(printer_id.to_string()));
        }
        for file in files {
            check(
                Command::new("lp")
                    .arg("-d")
                    .arg(printer_id)
                    .arg("-o")
                    .arg("fit-to-page")
                    .arg(file),
            )?;
            log::info!("Sent {} to printer {}", file.display(), printer_id);
        }
        Ok(())
    }

    fn open(&self, path: &Path) -> Result<(), PlatformError> {
        let opener = if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };
        check(Command::new(opener).arg(path))?;
        Ok(())
    }

    fn pick_directory(&self) -> Result<Option<PathBuf>, PlatformError> {
        let output = run(Command::new("zenity")
            .arg("--file-selection")
            .arg("--directory"))?;
        // zenity exits with 1 when the dialog is cancelled
        if !output.status.success() {
            return Ok(None);
        }
        let chosen = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!chosen.is_empty()).then(|| PathBuf::from(chosen)))
    }
}
