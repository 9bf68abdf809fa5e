use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use dialoguer::Confirm;
use indoc::indoc;
use log::{LevelFilter, info};

use scene_snapshot::{
    ExportSession, ExportSettings, ExportType, MemoryScene, NoProgress, ResourceMapper,
    default_file_name,
};

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::exit;

/// Where the document goes.
enum OutputTarget {
    Stdout,
    File(PathBuf),
    /// A directory; the file name is derived from what was exported.
    Directory(PathBuf),
}

struct SceneDump {
    settings: ExportSettings,
    input: String,
    output: OutputTarget,
    confirm_overwrite: bool,
    object: Option<String>,
    verbosity_level: Option<LevelFilter>,
}

impl SceneDump {
    pub fn from_cli_matches(matches: &ArgMatches) -> Result<Self> {
        let input = matches
            .get_one::<String>("INPUT")
            .context("INPUT is a required argument")?
            .clone();

        let output = match (
            matches.get_one::<String>("output-target"),
            matches.get_one::<String>("output-dir"),
        ) {
            (Some(path), _) => OutputTarget::File(PathBuf::from(path)),
            (None, Some(dir)) => OutputTarget::Directory(PathBuf::from(dir)),
            (None, None) => OutputTarget::Stdout,
        };

        let verbosity_level = match matches.get_count("verbose") {
            0 => None,
            1 => Some(LevelFilter::Info),
            2 => Some(LevelFilter::Debug),
            3 => Some(LevelFilter::Trace),
            _ => {
                eprintln!("using more than  -vvv does not affect verbosity level");
                Some(LevelFilter::Trace)
            }
        };

        Ok(SceneDump {
            settings: ExportSettings::new()
                .indent(!matches.get_flag("no-indent"))
                .skip_empty_components(!matches.get_flag("keep-empty-components")),
            input,
            output,
            confirm_overwrite: !matches.get_flag("no-confirm-overwrite"),
            object: matches.get_one::<String>("object").cloned(),
            verbosity_level,
        })
    }

    /// Main entry point for `SceneDump`
    pub fn run(&self) -> Result<()> {
        self.try_to_initialize_logging();

        let scene = self.load_scene()?;
        let mut session = ExportSession::new(&scene, ResourceMapper::new())
            .with_configuration(self.settings.clone());

        let (export_type, doc) = match &self.object {
            Some(name) => {
                let root = scene
                    .find_roots_by_name(name)
                    .next()
                    .with_context(|| {
                        format!("No root object named `{}` in `{}`", name, self.input)
                    })?;
                let doc = session
                    .export_object(root, &mut NoProgress)
                    .context("Failed to export object")?;
                (ExportType::CurrentObject, doc)
            }
            None => {
                let doc = session
                    .export_scene(&scene.scene_info(), &mut NoProgress)
                    .context("Failed to export scene")?;
                (ExportType::CurrentScene, doc)
            }
        };

        let text = session.to_json_string(&doc);
        match &self.output {
            OutputTarget::Stdout => {
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                writeln!(lock, "{}", text).context("Failed to write to stdout")?;
            }
            OutputTarget::File(path) => self.write_output(path, &text)?,
            OutputTarget::Directory(dir) => {
                let name = default_file_name(
                    export_type,
                    doc.objects.first().map(|o| o.name.as_str()),
                    &doc.name,
                    scene.name_of_scene(),
                );
                self.write_output(&dir.join(sanitize_file_name(&name)), &text)?;
            }
        }

        for message in session.log().messages() {
            info!("{}", message);
        }
        Ok(())
    }

    fn load_scene(&self) -> Result<MemoryScene> {
        if self.input == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read scene description from stdin")?;
            return MemoryScene::from_json_str(&buf)
                .context("Failed to load scene description from stdin");
        }

        let file = File::open(&self.input)
            .with_context(|| format!("Failed to open file {}", self.input))?;
        MemoryScene::from_reader(io::BufReader::new(file))
            .with_context(|| format!("Failed to load scene description from {}", self.input))
    }

    fn write_output(&self, path: &Path, text: &str) -> Result<()> {
        let mut file = Self::create_output_file(path, self.confirm_overwrite)?;
        file.write_all(text.as_bytes())
            .with_context(|| format!("Failed to write output file at `{}`", path.display()))?;
        info!("Output file `{}` written ({} bytes)", path.display(), text.len());
        Ok(())
    }

    /// If `prompt` is passed, will display a confirmation prompt before overwriting files.
    fn create_output_file(path: &Path, prompt: bool) -> Result<File> {
        if path.is_dir() {
            bail!(
                "There is a directory at {}, refusing to overwrite",
                path.display()
            );
        }

        if path.exists() && prompt {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Are you sure you want to override output file at {}",
                    path.display()
                ))
                .default(false)
                .interact()
                .context("Failed to write confirmation prompt to term")?;
            if !confirmed {
                bail!("Cancelled");
            }
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        File::create(path)
            .with_context(|| format!("Failed to create output file at `{}`", path.display()))
    }

    fn try_to_initialize_logging(&self) {
        if let Some(level) = self.verbosity_level {
            if let Err(e) =
                simplelog::WriteLogger::init(level, simplelog::Config::default(), io::stderr())
            {
                eprintln!("Failed to initialize logging: {}", e);
            }
        }
    }
}

/// Object and scene names may contain path separators.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

fn command() -> Command {
    Command::new("scene_dump")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Exports a scene description as a JSON scene snapshot")
        .long_about(indoc!(r#"
            Exports a scene description as a JSON scene snapshot.

            INPUT is a JSON scene description (`-` reads it from stdin). Every node gets a
            stable integer id in breadth-first order, shared meshes, materials and prefabs are
            deduplicated, and clashing sibling names get unique aliases (`name-#1`, ...).
        "#))
        .arg(Arg::new("INPUT").required(true))
        .arg(
            Arg::new("output-target")
                .long("output")
                .short('f')
                .value_name("PATH")
                .conflicts_with("output-dir")
                .help("Writes output to the file specified instead of stdout, errors will still be printed to stderr. \
                       Will ask for confirmation before overwriting files, to allow overwriting, pass `--no-confirm-overwrite`. \
                       Will create parent directories if needed."),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .short('d')
                .value_name("DIR")
                .help(
                    "Writes output into DIR, naming the file after the exported object or scene.",
                ),
        )
        .arg(
            Arg::new("object")
                .long("object")
                .value_name("NAME")
                .help("Exports only the first root object named NAME instead of the whole scene."),
        )
        .arg(
            Arg::new("no-confirm-overwrite")
                .long("no-confirm-overwrite")
                .action(ArgAction::SetTrue)
                .help(
                    "When set, will not ask for confirmation before overwriting files, \
                     useful for automation",
                ),
        )
        .arg(
            Arg::new("no-indent")
                .long("no-indent")
                .action(ArgAction::SetTrue)
                .help("When set, output will not be indented."),
        )
        .arg(
            Arg::new("keep-empty-components")
                .long("keep-empty-components")
                .action(ArgAction::SetTrue)
                .help("When set, empty component arrays are written instead of omitted."),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("-v - info, -vv - debug, -vvv - trace."),
        )
}

fn main() {
    let matches = command().get_matches();

    let result = SceneDump::from_cli_matches(&matches).and_then(|app| app.run());
    if let Err(e) = result {
        eprintln!("{:?}", e);
        exit(1);
    }
}

