//! Builders for PSBTs with deterministic keys and placeholder signatures.
//!
//! Signatures are structurally valid but sign nothing; finalization never
//! verifies them.

use bitcoin::{
    Amount,
    OutPoint,
    PublicKey,
    ScriptBuf,
    Sequence,
    Transaction,
    TxIn,
    TxOut,
    WPubkeyHash,
    Witness,
    absolute::LockTime,
    ecdsa,
    hashes::Hash,
    key::TweakedPublicKey,
    psbt::Psbt,
    secp256k1::{self, Secp256k1, SecretKey, schnorr},
    taproot,
    transaction::Version,
};

/// Script form of a spent output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpendKind {
    P2wpkh,
    P2pkh,
    P2shP2wpkh,
    P2tr,
    /// A script hash the finalizer cannot complete.
    P2wsh,
}

#[derive(Clone, Copy, Debug)]
struct InputSpec {
    kind: SpendKind,
    amount: Option<u64>,
    signed: bool,
}

/// Assemble a PSBT input by input.
///
/// ```rust
/// use bbqrflow_testing::{PsbtBuilder, SpendKind};
///
/// let psbt = PsbtBuilder::new()
///     .input(SpendKind::P2wpkh, 100_000, true)
///     .output(99_500)
///     .build();
/// assert_eq!(psbt.inputs.len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct PsbtBuilder {
    inputs: Vec<InputSpec>,
    outputs: Vec<u64>,
}

impl PsbtBuilder {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Add an input spending `amount` satoshis of `kind`.
    #[must_use]
    pub fn input(mut self, kind: SpendKind, amount: u64, signed: bool) -> Self {
        self.inputs.push(InputSpec {
            kind,
            amount: Some(amount),
            signed,
        });
        self
    }

    /// Add an input whose previous output is not recorded.
    #[must_use]
    pub fn input_without_utxo(mut self, kind: SpendKind, signed: bool) -> Self {
        self.inputs.push(InputSpec {
            kind,
            amount: None,
            signed,
        });
        self
    }

    /// Add a P2WPKH output of `amount` satoshis.
    #[must_use]
    pub fn output(mut self, amount: u64) -> Self {
        self.outputs.push(amount);
        self
    }

    /// Build the PSBT.
    ///
    /// # Panics
    ///
    /// Panics if more than 255 inputs or outputs were added.
    #[must_use]
    pub fn build(&self) -> Psbt {
        let secp = Secp256k1::new();
        let prepared: Vec<_> = self
            .inputs
            .iter()
            .enumerate()
            .map(|(index, spec)| prepare(&secp, seed(index, 1), *spec))
            .collect();

        let tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: prepared
                .iter()
                .map(|input| TxIn {
                    previous_output: input.outpoint,
                    sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
                    ..TxIn::default()
                })
                .collect(),
            output: self
                .outputs
                .iter()
                .enumerate()
                .map(|(index, amount)| TxOut {
                    value: Amount::from_sat(*amount),
                    script_pubkey: ScriptBuf::new_p2wpkh(&WPubkeyHash::from_byte_array(
                        [seed(index, 100); 20],
                    )),
                })
                .collect(),
        };

        let mut psbt = Psbt::from_unsigned_tx(tx).expect("transaction is unsigned");
        for (input, prepared) in psbt.inputs.iter_mut().zip(prepared) {
            *input = prepared.input;
        }
        psbt
    }

    /// Build and serialize the PSBT.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> { self.build().serialize() }
}

struct Prepared {
    outpoint: OutPoint,
    input: bitcoin::psbt::Input,
}

fn seed(index: usize, offset: u8) -> u8 {
    u8::try_from(index)
        .expect("fewer than 256 entries")
        .wrapping_add(offset)
}

fn prepare(secp: &Secp256k1<secp256k1::All>, seed: u8, spec: InputSpec) -> Prepared {
    let secret = SecretKey::from_slice(&[seed; 32]).expect("valid secret key");
    let key = PublicKey::new(secret.public_key(secp));
    let wpkh = ScriptBuf::new_p2wpkh(&key.wpubkey_hash().expect("compressed key"));

    let mut input = bitcoin::psbt::Input::default();
    let script_pubkey = match spec.kind {
        SpendKind::P2wpkh => wpkh,
        SpendKind::P2pkh => ScriptBuf::new_p2pkh(&key.pubkey_hash()),
        SpendKind::P2shP2wpkh => {
            let script = ScriptBuf::new_p2sh(&wpkh.script_hash());
            input.redeem_script = Some(wpkh);
            script
        }
        SpendKind::P2tr => {
            let (x_only, _) = key.inner.x_only_public_key();
            ScriptBuf::new_p2tr_tweaked(TweakedPublicKey::dangerous_assume_tweaked(x_only))
        }
        SpendKind::P2wsh => ScriptBuf::new_p2wsh(&ScriptBuf::new().wscript_hash()),
    };

    let mut outpoint = OutPoint::new(
        bitcoin::Txid::from_byte_array([seed; 32]),
        0,
    );
    if let Some(amount) = spec.amount {
        let utxo = TxOut {
            value: Amount::from_sat(amount),
            script_pubkey,
        };
        if spec.kind == SpendKind::P2pkh {
            let previous = Transaction {
                version: Version::TWO,
                lock_time: LockTime::ZERO,
                input: vec![TxIn::default()],
                output: vec![utxo],
            };
            outpoint = OutPoint::new(previous.compute_txid(), 0);
            input.non_witness_utxo = Some(previous);
        } else {
            input.witness_utxo = Some(utxo);
        }
    }

    if spec.signed {
        if spec.kind == SpendKind::P2tr {
            input.tap_key_sig = Some(taproot::Signature {
                signature: schnorr::Signature::from_slice(&[seed; 64])
                    .expect("64 byte signature"),
                sighash_type: bitcoin::TapSighashType::Default,
            });
        } else {
            let signature = secp256k1::ecdsa::Signature::from_compact(&[seed; 64])
                .expect("compact signature in range");
            input
                .partial_sigs
                .insert(key, ecdsa::Signature::sighash_all(signature));
        }
    }

    Prepared { outpoint, input }
}

/// Mark every input of `psbt` final with an empty witness, as if another
/// tool had finalized it already.
pub fn mark_final(psbt: &mut Psbt) {
    for input in &mut psbt.inputs {
        input.final_script_witness = Some(Witness::new());
    }
}
