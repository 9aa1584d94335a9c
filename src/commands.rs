//! Subcommand implementations for the `bbqrflow` binary.

use std::path::{Path, PathBuf};

use bbqrflow::{
    Error,
    Result,
    capture::{
        CaptureOutcome,
        CaptureReport,
        CaptureSession,
        FileSequence,
        FrameSource,
        LineSource,
    },
    config::{CaptureConfig, PlaybackConfig},
    fragment::{BbqrCodec, Encoding, FileType, FragmentCodec, SplitOptions, detect_type, join},
    inspect::{OutputRole, TransactionSummary, summarize},
    lifecycle::{Lifecycle, Suspend, Visibility},
    playback::{PlaybackEngine, QrTextRenderer},
    psbt::{finalize_psbt, parse_psbt, psbt_view, transaction_view},
    reassembly::{ReassembledPayload, ReassemblyEngine},
};
use bitcoin::{Network, Transaction, consensus};
use tokio::{
    io::{self, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    select,
    signal,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::{Command, EncodingArg, FileTypeArg, NetworkArg, SplitArgs};

pub async fn run(command: Command) -> Result<()> {
    match command {
        Command::Split { input, split } => split_cmd(&input, &split).await,
        Command::Join { inputs, out } => join_cmd(&inputs, out.as_deref()).await,
        Command::Scan {
            frames,
            expect,
            out,
        } => scan_cmd(frames, expect, out.as_deref()).await,
        Command::Play {
            input,
            interval_ms,
            split,
        } => play_cmd(&input, interval_ms, &split).await,
        Command::Inspect {
            input,
            network,
            json,
        } => inspect_cmd(&input, network, json).await,
        Command::Finalize { input, json } => finalize_cmd(&input, json).await,
        Command::Detect { input } => detect_cmd(&input).await,
    }
}

impl From<FileTypeArg> for FileType {
    fn from(arg: FileTypeArg) -> Self {
        match arg {
            FileTypeArg::Psbt => FileType::Psbt,
            FileTypeArg::Transaction => FileType::Transaction,
            FileTypeArg::Json => FileType::Json,
            FileTypeArg::Cbor => FileType::Cbor,
            FileTypeArg::Text => FileType::UnicodeText,
            FileTypeArg::Executable => FileType::Executable,
            FileTypeArg::Binary => FileType::Binary,
        }
    }
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Hex => Encoding::Hex,
            EncodingArg::Base32 => Encoding::Base32,
            EncodingArg::Zlib => Encoding::Zlib,
        }
    }
}

impl From<NetworkArg> for Network {
    fn from(arg: NetworkArg) -> Self {
        match arg {
            NetworkArg::Bitcoin => Network::Bitcoin,
            NetworkArg::Testnet => Network::Testnet,
            NetworkArg::Signet => Network::Signet,
            NetworkArg::Regtest => Network::Regtest,
        }
    }
}

async fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf).await?;
        Ok(buf)
    } else {
        Ok(tokio::fs::read(path).await?)
    }
}

async fn write_output(out: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match out {
        Some(path) => tokio::fs::write(path, bytes).await?,
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(bytes).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

/// Payload bytes and type, sniffing the type unless given.
fn typed_payload(raw: Vec<u8>, file_type: Option<FileTypeArg>) -> (Vec<u8>, FileType) {
    match file_type {
        Some(arg) => (raw, arg.into()),
        None => {
            let detected = BbqrCodec.detect_type(&raw);
            let file_type = detected.file_type();
            (detected.into_payload(), file_type)
        }
    }
}

fn split_options(args: &SplitArgs) -> SplitOptions {
    SplitOptions::default()
        .with_encoding(args.encoding.into())
        .with_split_range(args.min_split, args.max_split)
        .with_version_range(args.min_version, args.max_version)
}

fn split_payload(raw: Vec<u8>, args: &SplitArgs) -> Result<Vec<String>> {
    let (payload, file_type) = typed_payload(raw, args.file_type);
    let split = BbqrCodec.split(&payload, file_type, &split_options(args))?;
    info!(
        parts = split.len(),
        version = split.version(),
        file_type = %file_type,
        "payload split"
    );
    Ok(split.into_parts())
}

async fn split_cmd(input: &Path, args: &SplitArgs) -> Result<()> {
    let parts = split_payload(read_input(input).await?, args)?;
    let mut text = parts.join("\n");
    text.push('\n');
    write_output(None, text.as_bytes()).await
}

async fn read_fragments(inputs: &[PathBuf]) -> Result<Vec<String>> {
    let mut fragments = Vec::new();
    if inputs.is_empty() {
        let mut lines = BufReader::new(io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            fragments.push(line);
        }
    } else {
        for path in inputs {
            let text = tokio::fs::read_to_string(path).await?;
            fragments.extend(text.lines().map(str::to_owned));
        }
    }
    Ok(fragments
        .into_iter()
        .map(|line| line.trim().to_owned())
        .filter(|line| !line.is_empty())
        .collect())
}

async fn join_cmd(inputs: &[PathBuf], out: Option<&Path>) -> Result<()> {
    let fragments = read_fragments(inputs).await?;
    let joined = join(&fragments)?;
    eprintln!(
        "{} ({} bytes)",
        joined.file_type().label(),
        joined.payload().len()
    );
    write_output(out, joined.payload()).await
}

fn spawn_ctrl_c(token: &CancellationToken) {
    let token = token.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
}

async fn scan_cmd(
    frames: Vec<PathBuf>,
    expect: Option<FileTypeArg>,
    out: Option<&Path>,
) -> Result<()> {
    let config = match expect {
        Some(arg) => CaptureConfig::new().expect_type(arg.into()),
        None => CaptureConfig::new(),
    };
    let engine = ReassemblyEngine::with_config(BbqrCodec, config);
    let shutdown = CancellationToken::new();
    spawn_ctrl_c(&shutdown);

    let source: Box<dyn FrameSource> = if frames.is_empty() {
        Box::new(LineSource::new(BufReader::new(io::stdin())))
    } else {
        Box::new(FileSequence::new(frames))
    };
    let handle = CaptureSession::spawn(engine, source, &shutdown)?;

    let mut status = handle.status();
    let reporter = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let snapshot = *status.borrow_and_update();
            eprintln!("collected {}", snapshot.progress);
        }
    });

    let outcome = handle.join().await;
    reporter.abort();
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => {
            if let Some(report) = err.report() {
                print_fragments(report);
            }
            return Err(err.into());
        }
    };
    match outcome {
        CaptureOutcome::Complete(payload) => write_payload(&payload, out).await,
        CaptureOutcome::Exhausted(report) => {
            eprintln!("source ended after {} fragments", report.progress);
            print_fragments(&report);
            Ok(())
        }
        CaptureOutcome::Cancelled(report) => {
            eprintln!("scan cancelled at {}", report.progress);
            print_fragments(&report);
            Ok(())
        }
    }
}

/// Print collected fragments one per line so a later `scan` can resume
/// from them on stdin.
fn print_fragments(report: &CaptureReport) {
    for fragment in &report.fragments {
        println!("{fragment}");
    }
}

async fn write_payload(payload: &ReassembledPayload, out: Option<&Path>) -> Result<()> {
    eprintln!(
        "complete: {} ({} bytes)",
        payload.file_type().label(),
        payload.len()
    );
    write_output(out, payload.data()).await
}

async fn play_cmd(input: &Path, interval_ms: u64, args: &SplitArgs) -> Result<()> {
    let parts = split_payload(read_input(input).await?, args)?;
    let total = parts.len();
    let mut engine = PlaybackEngine::new(QrTextRenderer::new());
    engine.load(parts)?;
    engine.start(PlaybackConfig::from_millis(interval_ms))?;
    draw(&engine, total);

    let mut position = engine.subscribe();
    let mut lifecycle = Lifecycle::new();
    loop {
        select! {
            changed = position.changed() => {
                if changed.is_err() {
                    break;
                }
                draw(&engine, total);
            }
            _ = signal::ctrl_c() => {
                lifecycle.apply(Visibility::Hidden, &mut [&mut engine as &mut dyn Suspend]);
                break;
            }
        }
    }
    Ok(())
}

fn draw(engine: &PlaybackEngine<QrTextRenderer>, total: usize) {
    if let Some(frame) = engine.current_frame() {
        print!("\x1b[2J\x1b[H{}", frame.code());
        println!("part {} of {total}", engine.current_index() + 1);
    }
}

async fn inspect_cmd(input: &Path, network: NetworkArg, json: bool) -> Result<()> {
    let detected = detect_type(&read_input(input).await?);
    let network = Network::from(network);
    let tx = match detected.file_type() {
        FileType::Psbt => psbt_view(&parse_psbt(detected.payload())?, network),
        FileType::Transaction => {
            let tx: Transaction = consensus::deserialize(detected.payload())?;
            transaction_view(&tx, network)
        }
        other => return Err(Error::NotTransaction(other)),
    };
    let summary = summarize(&tx);
    if json {
        print_json(&summary)
    } else {
        print_summary(&summary);
        Ok(())
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{text}");
    Ok(())
}

fn print_summary(summary: &TransactionSummary) {
    println!("status: {}", summary.status);
    println!("shape: {:?}", summary.shape);
    for (index, output) in summary.outputs.iter().enumerate() {
        let address = output.address.as_deref().unwrap_or("(no address)");
        let role = match output.role {
            OutputRole::Change => " (change)",
            OutputRole::Recipient => "",
        };
        println!("output {index}{role}: {address} {}", output.amount_formatted);
    }
    let unknown = "unknown";
    println!("fee: {}", summary.fee_formatted.as_deref().unwrap_or(unknown));
    println!("total: {}", summary.total_formatted.as_deref().unwrap_or(unknown));
    if !summary.unsigned_inputs.is_empty() {
        println!("unsigned inputs: {:?}", summary.unsigned_inputs);
    }
}

async fn finalize_cmd(input: &Path, json: bool) -> Result<()> {
    let detected = detect_type(&read_input(input).await?);
    let psbt = parse_psbt(detected.payload())?;
    let finalized = finalize_psbt(psbt)?;
    if json {
        print_json(&finalized)
    } else {
        println!("txid: {}", finalized.txid);
        println!("size: {} bytes ({} vbytes)", finalized.size, finalized.vsize);
        println!("{}", finalized.hex);
        Ok(())
    }
}

async fn detect_cmd(input: &Path) -> Result<()> {
    let detected = detect_type(&read_input(input).await?);
    println!(
        "{} {} ({} bytes)",
        detected.file_type().code(),
        detected.file_type().label(),
        detected.payload().len()
    );
    Ok(())
}
