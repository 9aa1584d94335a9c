//! Command line interface for the `bbqrflow` binary.
//!
//! Kept free of library types so `build.rs` can include it to render the
//! man page.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command line arguments for the `bbqrflow` binary.
#[derive(Debug, Parser)]
#[command(
    name = "bbqrflow",
    version,
    about = "Split, animate, scan and reassemble BBQr multi-part QR codes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Split a file into BBQr fragments, one per line.
    Split {
        /// File to split, `-` for stdin.
        input: PathBuf,
        #[command(flatten)]
        split: SplitArgs,
    },
    /// Reassemble fragments read one per line.
    Join {
        /// Files holding fragments; stdin when omitted.
        inputs: Vec<PathBuf>,
        /// Write the payload here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Capture fragments from a scanner on stdin or from frame files.
    Scan {
        /// Frame files read in order; stdin lines when omitted.
        frames: Vec<PathBuf>,
        /// Fail unless the payload has this type.
        #[arg(long, value_enum)]
        expect: Option<FileTypeArg>,
        /// Write the payload here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Animate a file as cycling QR codes in the terminal.
    Play {
        /// File to show, `-` for stdin.
        input: PathBuf,
        /// Milliseconds between frames.
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
        #[command(flatten)]
        split: SplitArgs,
    },
    /// Summarise a PSBT or transaction.
    Inspect {
        /// PSBT (binary, base64 or hex) or transaction, `-` for stdin.
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = NetworkArg::Bitcoin)]
        network: NetworkArg,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Finalize a fully signed PSBT into a broadcastable transaction.
    Finalize {
        /// Signed PSBT (binary, base64 or hex), `-` for stdin.
        input: PathBuf,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Guess the BBQr file type of a file.
    Detect {
        /// File to inspect, `-` for stdin.
        input: PathBuf,
    },
}

/// Layout options shared by `split` and `play`.
#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Payload type; sniffed from the content when omitted.
    #[arg(long = "type", value_enum)]
    pub file_type: Option<FileTypeArg>,
    /// Wire encoding; zlib falls back to base32 when compression does not
    /// shrink the payload.
    #[arg(long, value_enum, default_value_t = EncodingArg::Zlib)]
    pub encoding: EncodingArg,
    #[arg(long, default_value_t = 1)]
    pub min_split: u16,
    #[arg(long, default_value_t = 1295)]
    pub max_split: u16,
    #[arg(long, default_value_t = 5)]
    pub min_version: u8,
    #[arg(long, default_value_t = 40)]
    pub max_version: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FileTypeArg {
    Psbt,
    Transaction,
    Json,
    Cbor,
    Text,
    Executable,
    Binary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EncodingArg {
    Hex,
    Base32,
    Zlib,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum NetworkArg {
    Bitcoin,
    Testnet,
    Signet,
    Regtest,
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;

    use super::{Cli, Command, EncodingArg, FileTypeArg, NetworkArg};

    #[test]
    fn parses_split_options() {
        let cli = Cli::parse_from([
            "bbqrflow",
            "split",
            "tx.psbt",
            "--type",
            "psbt",
            "--encoding",
            "hex",
            "--min-split",
            "3",
        ]);
        let Command::Split { input, split } = cli.command else {
            panic!("expected split");
        };
        assert_eq!(input, Path::new("tx.psbt"));
        assert_eq!(split.file_type, Some(FileTypeArg::Psbt));
        assert_eq!(split.encoding, EncodingArg::Hex);
        assert_eq!((split.min_split, split.max_split), (3, 1295));
        assert_eq!((split.min_version, split.max_version), (5, 40));
    }

    #[test]
    fn split_encoding_defaults_to_zlib() {
        let cli = Cli::parse_from(["bbqrflow", "split", "tx.psbt"]);
        let Command::Split { split, .. } = cli.command else {
            panic!("expected split");
        };
        assert_eq!(split.encoding, EncodingArg::Zlib);
    }

    #[test]
    fn inspect_defaults_to_mainnet_text() {
        let cli = Cli::parse_from(["bbqrflow", "inspect", "-"]);
        let Command::Inspect { network, json, .. } = cli.command else {
            panic!("expected inspect");
        };
        assert_eq!(network, NetworkArg::Bitcoin);
        assert!(!json);
    }

    #[test]
    fn play_interval_defaults_to_one_second() {
        let cli = Cli::parse_from(["bbqrflow", "play", "codes.txt"]);
        let Command::Play { interval_ms, .. } = cli.command else {
            panic!("expected play");
        };
        assert_eq!(interval_ms, 1000);
    }

    #[test]
    fn scan_accepts_frame_files_and_expectation() {
        let cli = Cli::parse_from(["bbqrflow", "scan", "a.txt", "b.txt", "--expect", "psbt"]);
        let Command::Scan { frames, expect, out } = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(frames.len(), 2);
        assert_eq!(expect, Some(FileTypeArg::Psbt));
        assert!(out.is_none());
    }
}
