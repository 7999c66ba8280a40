//! Thin CLI wrapper around the `jpakit` library: `dump` unpacks a binary
//! particle archive directory into hand-editable JSON/BTI, `pack` rebuilds
//! the binary archive from that JSON form.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use jpakit::doc::{effects, particle_file, particles};
use jpakit::formats::jpc::Container;

#[derive(Parser)]
#[command(name = "jpakit", about = "Nintendo JPAC 2-10 particle archive codec")]
struct Cli {
    /// Print per-file progress and non-fatal warnings.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Unpack a binary particle archive into a JSON/BTI document directory.
    Dump { input_dir: PathBuf, output_dir: PathBuf },
    /// Rebuild a binary particle archive from a JSON/BTI document directory.
    Pack { input_dir: PathBuf, output_dir: PathBuf },
}

/// A `jpakit::Error` pinned to the file (and, where known, the block tag)
/// that produced it. The library itself never constructs these - its own
/// `Result<T, Error>` stays unlocated so it's cheap to build and match on
/// in tests - this exists only at the boundary where the CLI reports a
/// failure to the user.
struct Located {
    path: PathBuf,
    tag: Option<&'static str>,
    source: jpakit::Error,
}

impl Located {
    fn new(path: impl Into<PathBuf>, source: impl Into<jpakit::Error>) -> Self {
        Located { path: path.into(), tag: None, source: source.into() }
    }

    fn tagged(path: impl Into<PathBuf>, tag: &'static str, source: impl Into<jpakit::Error>) -> Self {
        Located { path: path.into(), tag: Some(tag), source: source.into() }
    }
}

impl fmt::Display for Located {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Some(tag) => write!(f, "{}: {} (in {tag})", self.path.display(), self.source),
            None => write!(f, "{}: {}", self.path.display(), self.source),
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Command::Dump { input_dir, output_dir } => dump(&input_dir, &output_dir),
        Command::Pack { input_dir, output_dir } => pack(&input_dir, &output_dir),
    };

    match result {
        Ok(()) => ExitCode::from(0),
        Err(loc) => {
            let code = match loc.source {
                jpakit::Error::Io(_) => 2,
                _ => 3,
            };
            log::error!("{loc}");
            ExitCode::from(code)
        }
    }
}

fn dump(input_dir: &Path, output_dir: &Path) -> Result<(), Located> {
    fs::create_dir_all(output_dir).map_err(|e| Located::new(output_dir, e))?;
    fs::create_dir_all(output_dir.join("Particles")).map_err(|e| Located::new(output_dir, e))?;
    fs::create_dir_all(output_dir.join("Textures")).map_err(|e| Located::new(output_dir, e))?;

    let jpc_path = input_dir.join("Particles.jpc");
    let container_bytes = fs::read(&jpc_path).map_err(|e| Located::new(&jpc_path, e))?;
    let container =
        Container::parse(&container_bytes).map_err(|e| Located::new(&jpc_path, e))?;
    log::info!(
        "read {} resources, {} textures",
        container.resources.len(),
        container.textures.len()
    );

    let names_path = input_dir.join("ParticleNames.bcsv");
    let names = if let Ok(bytes) = fs::read(&names_path) {
        let table = jpakit::formats::bcsv::Table::parse(&bytes)
            .map_err(|e| Located::tagged(&names_path, "ParticleNames", e))?;
        particles::table_to_names(&table).map_err(|e| Located::tagged(&names_path, "ParticleNames", e))?
    } else {
        (0..container.resources.len()).map(|i| format!("particle_{i:04}")).collect()
    };

    for (name, resource) in names.iter().zip(&container.resources) {
        let doc = particle_file::ParticleDoc::from(resource);
        let json = serde_json::to_string_pretty(&doc).map_err(|e| Located::new(input_dir, e))?;
        let path = output_dir.join("Particles").join(format!("{name}.json"));
        fs::write(&path, json).map_err(|e| Located::new(&path, e))?;
        log::debug!("wrote Particles/{name}.json");
    }

    let texture_names: Vec<String> = (0..container.textures.len() as u16).map(particle_file::texture_name).collect();
    for (name, texture) in texture_names.iter().zip(&container.textures) {
        let path = output_dir.join("Textures").join(format!("{name}.bti"));
        fs::write(&path, texture.encode()).map_err(|e| Located::new(&path, e))?;
    }

    let index_path = output_dir.join("Particles.json");
    let index = particles::Index { particles: names, textures: texture_names };
    let index_json = serde_json::to_string_pretty(&index).map_err(|e| Located::new(&index_path, e))?;
    fs::write(&index_path, index_json).map_err(|e| Located::new(&index_path, e))?;

    let effects_src_path = input_dir.join("AutoEffectList.bcsv");
    if let Ok(bytes) = fs::read(&effects_src_path) {
        let table = jpakit::formats::bcsv::Table::parse(&bytes)
            .map_err(|e| Located::tagged(&effects_src_path, "AutoEffectList", e))?;
        let entries = effects::table_to_entries(&table)
            .map_err(|e| Located::tagged(&effects_src_path, "AutoEffectList", e))?;
        let effects_out_path = output_dir.join("Effects.json");
        let json = serde_json::to_string_pretty(&entries).map_err(|e| Located::new(&effects_out_path, e))?;
        fs::write(&effects_out_path, json).map_err(|e| Located::new(&effects_out_path, e))?;
    }

    Ok(())
}

fn pack(input_dir: &Path, output_dir: &Path) -> Result<(), Located> {
    fs::create_dir_all(output_dir).map_err(|e| Located::new(output_dir, e))?;

    let index_path = input_dir.join("Particles.json");
    let index_text = fs::read_to_string(&index_path).map_err(|e| Located::new(&index_path, e))?;
    let index: particles::Index =
        serde_json::from_str(&index_text).map_err(|e| Located::new(&index_path, e))?;

    let mut resources = Vec::with_capacity(index.particles.len());
    for name in &index.particles {
        let path = input_dir.join("Particles").join(format!("{name}.json"));
        let text = fs::read_to_string(&path).map_err(|e| Located::new(&path, e))?;
        let doc: particle_file::ParticleDoc =
            serde_json::from_str(&text).map_err(|e| Located::new(&path, e))?;
        let resource = jpakit::formats::jpa::Resource::try_from(doc)
            .map_err(|e| Located::tagged(&path, "ParticleDoc", e))?;
        resources.push(resource);
        log::debug!("read Particles/{name}.json");
    }

    let mut textures = Vec::with_capacity(index.textures.len());
    for name in &index.textures {
        let path = input_dir.join("Textures").join(format!("{name}.bti"));
        let bytes = fs::read(&path).map_err(|e| Located::new(&path, e))?;
        textures.push(
            jpakit::formats::bti::Texture::parse(&bytes).map_err(|e| Located::new(&path, e))?,
        );
    }

    let mut container = Container { resources, textures };
    container.dedupe_textures();
    let jpc_path = output_dir.join("Particles.jpc");
    fs::write(&jpc_path, container.encode()).map_err(|e| Located::new(&jpc_path, e))?;

    let names_path = output_dir.join("ParticleNames.bcsv");
    let names_table = particles::names_to_table(&index.particles);
    let names_bytes = names_table.encode().map_err(|e| Located::tagged(&names_path, "ParticleNames", e))?;
    fs::write(&names_path, names_bytes).map_err(|e| Located::new(&names_path, e))?;

    let effects_path = input_dir.join("Effects.json");
    if let Ok(text) = fs::read_to_string(&effects_path) {
        let entries: Vec<effects::EffectEntry> =
            serde_json::from_str(&text).map_err(|e| Located::new(&effects_path, e))?;
        let table = effects::entries_to_table(&entries);
        let out_path = output_dir.join("AutoEffectList.bcsv");
        let bytes = table.encode().map_err(|e| Located::tagged(&out_path, "AutoEffectList", e))?;
        fs::write(&out_path, bytes).map_err(|e| Located::new(&out_path, e))?;
    }

    log::info!("wrote {} resources to {}", index.particles.len(), output_dir.display());
    Ok(())
}
