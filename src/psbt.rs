//! PSBT import, inspection and finalization on top of the `bitcoin` crate.
//!
//! Text import accepts base64 or hex. Finalization covers single-key
//! spends: P2WPKH, P2PKH, P2SH-wrapped P2WPKH and taproot key path.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use bitcoin::{
    Address,
    Network,
    PublicKey,
    Script,
    ScriptBuf,
    Transaction,
    Txid,
    Witness,
    consensus::encode::serialize_hex,
    ecdsa,
    psbt::{self, Psbt},
    script::{Builder, PushBytesBuf},
};
use log::{debug, info};
use serde::Serialize;
use thiserror::Error;

use crate::inspect::{InputInfo, OutputInfo, ParsedTransaction};

/// Smallest byte length accepted as a PSBT.
pub const MIN_PSBT_LEN: usize = 10;

/// Failures importing a PSBT.
#[derive(Debug, Error)]
pub enum PsbtError {
    /// The text was blank.
    #[error("no PSBT data provided")]
    Empty,
    /// The text was neither base64 nor hex.
    #[error("PSBT text is neither base64 nor hex")]
    InvalidEncoding,
    /// Too few bytes to hold a PSBT.
    #[error("PSBT data too short: {len} bytes")]
    TooShort { len: usize },
    /// The bytes are not a valid PSBT.
    #[error("invalid PSBT: {0}")]
    Parse(#[from] psbt::Error),
}

/// Failures turning a signed PSBT into a broadcastable transaction.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FinalizeError {
    /// Some inputs carry no signature.
    #[error("{} input(s) still need signatures: {inputs:?}", inputs.len())]
    MissingSignatures { inputs: Vec<usize> },
    /// The spent output of an input is unknown.
    #[error("input {input} lacks its previous output")]
    MissingUtxo { input: usize },
    /// No signature matches the key the spent script commits to.
    #[error("input {input} has no signature for its spending key")]
    NoMatchingKey { input: usize },
    /// The spent script is not a supported single-key form.
    #[error("input {input} spends an unsupported script type")]
    UnsupportedScript { input: usize },
}

/// A finalized, serialized transaction ready to broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FinalizedTransaction {
    /// Consensus-encoded transaction as lower-case hex.
    pub hex: String,
    pub txid: Txid,
    /// Serialized size in bytes, witness included.
    pub size: usize,
    pub vsize: usize,
}

/// Decode PSBT text given as base64 or hex, ignoring whitespace.
///
/// # Errors
///
/// Returns [`PsbtError::Empty`] for blank text,
/// [`PsbtError::InvalidEncoding`] when neither decoding applies and
/// [`PsbtError::TooShort`] below [`MIN_PSBT_LEN`] bytes.
///
/// # Examples
///
/// ```
/// use bbqrflow::psbt::decode_psbt_text;
/// let bytes = decode_psbt_text("70736274ff 0100 0000 0000").expect("hex");
/// assert!(bytes.starts_with(b"psbt\xff"));
/// ```
pub fn decode_psbt_text(text: &str) -> Result<Vec<u8>, PsbtError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(PsbtError::Empty);
    }
    let bytes = if compact.len() % 2 == 0 && compact.bytes().all(|b| b.is_ascii_hexdigit()) {
        hex::decode(&compact).map_err(|_| PsbtError::InvalidEncoding)?
    } else {
        STANDARD
            .decode(compact.as_bytes())
            .map_err(|_| PsbtError::InvalidEncoding)?
    };
    if bytes.len() < MIN_PSBT_LEN {
        return Err(PsbtError::TooShort { len: bytes.len() });
    }
    Ok(bytes)
}

/// Deserialize a binary PSBT.
///
/// # Errors
///
/// Returns [`PsbtError::TooShort`] below [`MIN_PSBT_LEN`] bytes and
/// [`PsbtError::Parse`] for malformed data.
pub fn parse_psbt(bytes: &[u8]) -> Result<Psbt, PsbtError> {
    if bytes.len() < MIN_PSBT_LEN {
        return Err(PsbtError::TooShort { len: bytes.len() });
    }
    let psbt = Psbt::deserialize(bytes)?;
    debug!(
        "parsed PSBT with {} inputs and {} outputs",
        psbt.inputs.len(),
        psbt.unsigned_tx.output.len()
    );
    Ok(psbt)
}

fn is_signed(input: &psbt::Input) -> bool {
    !input.partial_sigs.is_empty()
        || input.tap_key_sig.is_some()
        || !input.tap_script_sigs.is_empty()
        || is_final(input)
}

fn is_final(input: &psbt::Input) -> bool {
    input.final_script_sig.is_some() || input.final_script_witness.is_some()
}

fn spent_output(psbt: &Psbt, index: usize) -> Option<&bitcoin::TxOut> {
    let input = psbt.inputs.get(index)?;
    if let Some(utxo) = &input.witness_utxo {
        return Some(utxo);
    }
    let outpoint = psbt.unsigned_tx.input.get(index)?.previous_output;
    let vout = usize::try_from(outpoint.vout).ok()?;
    input.non_witness_utxo.as_ref()?.output.get(vout)
}

fn outputs_view(tx: &Transaction, network: Network) -> Vec<OutputInfo> {
    tx.output
        .iter()
        .map(|txout| OutputInfo {
            address: Address::from_script(&txout.script_pubkey, network)
                .ok()
                .map(|address| address.to_string()),
            amount: txout.value.to_sat(),
        })
        .collect()
}

/// Reduce a PSBT to the inspector's transaction view.
#[must_use]
pub fn psbt_view(psbt: &Psbt, network: Network) -> ParsedTransaction {
    let inputs = psbt
        .inputs
        .iter()
        .enumerate()
        .map(|(index, input)| InputInfo {
            amount: spent_output(psbt, index).map(|txout| txout.value.to_sat()),
            signed: is_signed(input),
        })
        .collect();
    ParsedTransaction::new(inputs, outputs_view(&psbt.unsigned_tx, network))
}

/// Reduce a raw transaction to the inspector's transaction view.
///
/// Input amounts are unknown; an input counts as signed when it carries a
/// script signature or witness.
#[must_use]
pub fn transaction_view(tx: &Transaction, network: Network) -> ParsedTransaction {
    let inputs = tx
        .input
        .iter()
        .map(|txin| InputInfo {
            amount: None,
            signed: !txin.script_sig.is_empty() || !txin.witness.is_empty(),
        })
        .collect();
    ParsedTransaction::new(inputs, outputs_view(tx, network))
}

/// Finalize every input of a fully signed PSBT and extract the
/// transaction.
///
/// Inputs that are already final are left untouched.
///
/// # Errors
///
/// Returns [`FinalizeError::MissingSignatures`] listing every unsigned
/// input before anything is modified, and the other variants for inputs
/// whose script cannot be completed.
pub fn finalize_psbt(mut psbt: Psbt) -> Result<FinalizedTransaction, FinalizeError> {
    let unsigned: Vec<usize> = psbt
        .inputs
        .iter()
        .enumerate()
        .filter(|(_, input)| !is_signed(input))
        .map(|(index, _)| index)
        .collect();
    if !unsigned.is_empty() {
        return Err(FinalizeError::MissingSignatures { inputs: unsigned });
    }

    for index in 0..psbt.inputs.len() {
        if is_final(&psbt.inputs[index]) {
            continue;
        }
        let script = spent_output(&psbt, index)
            .map(|txout| txout.script_pubkey.clone())
            .ok_or(FinalizeError::MissingUtxo { input: index })?;
        let input = &mut psbt.inputs[index];
        finalize_input(input, &script, index)?;
        clear_signing_data(input);
        debug!("finalized input {index}");
    }

    let tx = psbt.extract_tx_unchecked_fee_rate();
    let finalized = FinalizedTransaction {
        hex: serialize_hex(&tx),
        txid: tx.compute_txid(),
        size: tx.total_size(),
        vsize: tx.vsize(),
    };
    info!(
        "finalized transaction {} ({} bytes)",
        finalized.txid, finalized.size
    );
    Ok(finalized)
}

fn finalize_input(input: &mut psbt::Input, script: &Script, index: usize) -> Result<(), FinalizeError> {
    if script.is_p2tr() {
        let sig = input
            .tap_key_sig
            .ok_or(FinalizeError::UnsupportedScript { input: index })?;
        input.final_script_witness = Some(Witness::from_slice(&[sig.to_vec()]));
    } else if script.is_p2wpkh() {
        let (key, sig) = signer_for(input, script, index)?;
        input.final_script_witness = Some(p2wpkh_witness(&key, &sig));
    } else if script.is_p2pkh() {
        let (key, sig) = signer_for(input, script, index)?;
        let sig_push = push_bytes(sig.to_vec(), index)?;
        input.final_script_sig = Some(
            Builder::new()
                .push_slice(sig_push)
                .push_key(&key)
                .into_script(),
        );
    } else if script.is_p2sh() {
        let redeem = input
            .redeem_script
            .clone()
            .filter(|redeem| redeem.is_p2wpkh() && ScriptBuf::new_p2sh(&redeem.script_hash()).as_script() == script)
            .ok_or(FinalizeError::UnsupportedScript { input: index })?;
        let (key, sig) = signer_for(input, &redeem, index)?;
        input.final_script_sig = Some(
            Builder::new()
                .push_slice(push_bytes(redeem.to_bytes(), index)?)
                .into_script(),
        );
        input.final_script_witness = Some(p2wpkh_witness(&key, &sig));
    } else {
        return Err(FinalizeError::UnsupportedScript { input: index });
    }
    Ok(())
}

fn signer_for(
    input: &psbt::Input,
    script: &Script,
    index: usize,
) -> Result<(PublicKey, ecdsa::Signature), FinalizeError> {
    input
        .partial_sigs
        .iter()
        .find(|(key, _)| commits_to(key, script))
        .map(|(key, sig)| (*key, *sig))
        .ok_or(FinalizeError::NoMatchingKey { input: index })
}

fn commits_to(key: &PublicKey, script: &Script) -> bool {
    if script.is_p2pkh() {
        ScriptBuf::new_p2pkh(&key.pubkey_hash()).as_script() == script
    } else {
        key.wpubkey_hash()
            .is_ok_and(|hash| ScriptBuf::new_p2wpkh(&hash).as_script() == script)
    }
}

fn p2wpkh_witness(key: &PublicKey, sig: &ecdsa::Signature) -> Witness {
    Witness::from_slice(&[sig.to_vec(), key.to_bytes()])
}

fn push_bytes(bytes: Vec<u8>, index: usize) -> Result<PushBytesBuf, FinalizeError> {
    PushBytesBuf::try_from(bytes).map_err(|_| FinalizeError::UnsupportedScript { input: index })
}

fn clear_signing_data(input: &mut psbt::Input) {
    input.partial_sigs.clear();
    input.sighash_type = None;
    input.redeem_script = None;
    input.witness_script = None;
    input.bip32_derivation.clear();
    input.tap_key_sig = None;
    input.tap_script_sigs.clear();
    input.tap_scripts.clear();
    input.tap_key_origins.clear();
    input.tap_internal_key = None;
    input.tap_merkle_root = None;
}
