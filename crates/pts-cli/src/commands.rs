use std::path::Path;
use std::sync::mpsc;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{info, info_span};

use pts_blob::{FdtHeader, fragment_ranges, merge};
use pts_chip::{CATALOG, detect};
use pts_codec::Document;
use pts_cli::render::{
    FragmentInfo, chips_table, fragments_table, level_rows, levels_table, op_points_table,
    plain_listing,
};
use pts_editor::{Edit, EditorConfig, EditorController, WorkerUpdate, spawn_build};
use pts_persistence::{ARMOR_PREFIX, Envelope, read_text};

use crate::cli::{
    BuildArgs, DetectArgs, EditArgs, EditOperation, ExportArgs, ImportArgs, MergeArgs, ShowArgs,
    SourceArgs, SplitArgs,
};

pub fn run_split(args: &SplitArgs) -> Result<()> {
    let data = std::fs::read(&args.blob)
        .with_context(|| format!("read {}", args.blob.display()))?;
    let ranges = fragment_ranges(&data);
    if ranges.is_empty() {
        println!("No device tree fragments found in {}", args.blob.display());
        return Ok(());
    }

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create {}", args.out.display()))?;
    let mut fragments = Vec::with_capacity(ranges.len());
    for (index, range) in ranges.into_iter().enumerate() {
        let bytes = &data[range.clone()];
        let path = args.out.join(format!("{index}.dtb"));
        std::fs::write(&path, bytes).with_context(|| format!("write {}", path.display()))?;
        fragments.push(FragmentInfo {
            index,
            offset: range.start,
            size: bytes.len(),
            header: FdtHeader::parse(bytes).ok(),
        });
    }
    info!(fragments = fragments.len(), out = %args.out.display(), "Split blob");
    println!("{}", fragments_table(&fragments));
    Ok(())
}

pub fn run_merge(args: &MergeArgs) -> Result<()> {
    let parts = args
        .parts
        .iter()
        .map(|path| std::fs::read(path).with_context(|| format!("read {}", path.display())))
        .collect::<Result<Vec<_>>>()?;
    let merged = merge(&parts);
    std::fs::write(&args.output, &merged)
        .with_context(|| format!("write {}", args.output.display()))?;
    println!(
        "Merged {} fragments into {} ({} bytes)",
        parts.len(),
        args.output.display(),
        merged.len()
    );
    Ok(())
}

pub fn run_chips() {
    println!("{}", chips_table(CATALOG));
}

pub fn run_detect(args: &DetectArgs) -> Result<()> {
    let text = read_text(&args.source)?;
    let matches = detect(&text);
    if matches.is_empty() {
        bail!("no chip profile matches {}", args.source.display());
    }
    for profile in matches {
        println!("{}\t{}", profile.key, profile.name);
    }
    Ok(())
}

pub fn run_show(args: &ShowArgs) -> Result<()> {
    let profile = pts_chip::find(&args.target.chip)?;
    let text = read_text(&args.target.source)?;
    let document = Document::decode(&text, profile)
        .with_context(|| format!("decode {} as {}", args.target.source.display(), profile.key))?;

    if args.plain {
        println!("{}", plain_listing(profile, &document));
        return Ok(());
    }
    println!("{profile}");
    println!("{}", levels_table(profile, &document));
    if let Some(table) = op_points_table(&document) {
        println!("Voltage table:");
        println!("{table}");
    }
    Ok(())
}

pub fn run_edit(args: &EditArgs, config: EditorConfig) -> Result<()> {
    let controller = open(&args.target, config)?;
    let edit = edit_for(&args.operation);
    let description = edit.to_string();

    let span = info_span!("edit", chip = %args.target.chip);
    let document = span.in_scope(|| controller.apply_change(&edit))?;
    let path = controller.save()?;

    println!("{description}");
    let profile = controller
        .active_profile()
        .ok_or_else(|| anyhow!("no active chip"))?;
    let levels = level_rows(profile, &document).len();
    println!("Saved {} ({levels} levels)", path.display());
    Ok(())
}

pub fn run_export(args: &ExportArgs, config: EditorConfig) -> Result<()> {
    let controller = open(&args.target, config)?;
    let envelope = controller.export_envelope(&args.description)?;

    match &args.out {
        Some(path) => {
            let bytes = envelope.to_bytes()?;
            std::fs::write(path, &bytes).with_context(|| format!("write {}", path.display()))?;
            println!("Exported {} to {} ({} bytes)", envelope.chip, path.display(), bytes.len());
        }
        None => println!("{}", envelope.to_armored()?),
    }
    Ok(())
}

pub fn run_import(args: &ImportArgs, config: EditorConfig) -> Result<()> {
    let envelope = read_envelope(&args.envelope)?;
    let controller = open(&args.target, config)?;

    controller.import_envelope(&envelope)?;
    let path = controller.save()?;
    println!(
        "Imported '{}' from {} into {}",
        envelope.description,
        envelope.chip,
        path.display()
    );
    Ok(())
}

pub fn run_build(args: &BuildArgs, config: EditorConfig) -> Result<()> {
    let mut build = config.build;
    if let Some(secs) = args.timeout_secs {
        build.timeout_secs = secs;
    }

    let (sender, receiver) = mpsc::channel();
    let worker = spawn_build(build, args.source.clone(), args.out.clone(), sender);
    let update = receiver.recv().context("build worker stopped without a result")?;
    if worker.join().is_err() {
        bail!("build worker panicked");
    }

    match update {
        WorkerUpdate::BuildFinished { output, elapsed } => {
            println!("Built {} in {:.1}s", output.display(), elapsed.as_secs_f64());
            Ok(())
        }
        WorkerUpdate::BuildFailed { message } => Err(anyhow!(message)),
        other => Err(anyhow!("unexpected worker update: {other:?}")),
    }
}

fn open(target: &SourceArgs, config: EditorConfig) -> Result<EditorController> {
    let controller = EditorController::new(config);
    controller.register_target(&target.chip, &target.source)?;
    controller
        .switch_profile(&target.chip)
        .with_context(|| format!("open {} as {}", target.source.display(), target.chip))?;
    Ok(controller)
}

fn read_envelope(path: &Path) -> Result<Envelope> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let armored = std::str::from_utf8(&bytes)
        .ok()
        .map(str::trim)
        .filter(|text| text.starts_with(ARMOR_PREFIX));
    let envelope = match armored {
        Some(text) => Envelope::from_armored(text)?,
        None => Envelope::from_bytes(&bytes)?,
    };
    Ok(envelope)
}

fn edit_for(operation: &EditOperation) -> Edit {
    match operation {
        EditOperation::AddTop { bin } => Edit::AddLevelTop { bin: *bin },
        EditOperation::AddBottom { bin } => Edit::AddLevelBottom { bin: *bin },
        EditOperation::Remove { bin, level } => Edit::RemoveLevel {
            bin: *bin,
            level: *level,
        },
        EditOperation::Move { bin, from, to } => Edit::MoveLevel {
            bin: *bin,
            from: *from,
            to: *to,
        },
        EditOperation::Set {
            bin,
            level,
            key,
            value,
        } => Edit::SetLevelValue {
            bin: *bin,
            level: *level,
            key: key.clone(),
            value: *value,
        },
        EditOperation::SetVoltage { bin, level, label } => Edit::SetVoltageLevel {
            bin: *bin,
            level: *level,
            label: label.clone(),
        },
    }
}
