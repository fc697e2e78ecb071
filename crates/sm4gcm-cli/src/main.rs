//! Command-line interface for `sm4-gcm`.

#![forbid(unsafe_code)]

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sm4_core::{Sm4, Sm4Key};
use sm4_gcm::{Error as GcmError, Sm4Gcm, NONCE_SIZE, TAG_SIZE};
use tracing::{debug, info, Level};

/// SM4-GCM CLI.
#[derive(Parser)]
#[command(
    name = "sm4gcm",
    version,
    author,
    about = "SM4-GCM authenticated encryption (GB/T 32907 + NIST SP 800-38D)"
)]
struct Cli {
    /// Log verbosity, written to stderr.
    #[arg(
        long,
        global = true,
        env = "SM4GCM_LOG",
        value_enum,
        default_value_t = LogLevel::Warn
    )]
    log_level: LogLevel,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file; the output is ciphertext followed by the 16-byte tag.
    Enc {
        /// SM4 key as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// Nonce as hex (12 bytes recommended). Never reuse one under the same key.
        #[arg(long, value_name = "HEX")]
        nonce_hex: String,
        /// Associated data as hex.
        #[arg(long, value_name = "HEX", default_value = "")]
        aad_hex: String,
        /// Plaintext input file.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Output path for ciphertext || tag.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Verify and decrypt a file produced by `enc`. Nothing is written on failure.
    Dec {
        /// SM4 key as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// Nonce used for encryption, as hex.
        #[arg(long, value_name = "HEX")]
        nonce_hex: String,
        /// Associated data as hex.
        #[arg(long, value_name = "HEX", default_value = "")]
        aad_hex: String,
        /// Input file (ciphertext || tag).
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Output plaintext path.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Check the block cipher and SM4-GCM against published vectors.
    Kat,
    /// Run a local demo: random key and nonce, seal a message, open it back.
    Demo {
        /// Message to encrypt.
        #[arg(long, default_value = "The quick brown fox jumps over the lazy dog")]
        message: String,
        /// Optional RNG seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Enc {
            key_hex,
            nonce_hex,
            aad_hex,
            input,
            output,
        } => cmd_enc(&key_hex, &nonce_hex, &aad_hex, &input, &output),
        Commands::Dec {
            key_hex,
            nonce_hex,
            aad_hex,
            input,
            output,
        } => cmd_dec(&key_hex, &nonce_hex, &aad_hex, &input, &output),
        Commands::Kat => cmd_kat(),
        Commands::Demo { message, seed } => cmd_demo(&message, seed),
    }
}

fn cmd_enc(
    key_hex: &str,
    nonce_hex: &str,
    aad_hex: &str,
    input_path: &PathBuf,
    output_path: &PathBuf,
) -> Result<()> {
    let gcm = session_from_hex(key_hex)?;
    let nonce = parse_hex("nonce", nonce_hex)?;
    let aad = parse_hex("aad", aad_hex)?;
    let plaintext =
        fs::read(input_path).with_context(|| format!("read {}", input_path.display()))?;

    let sealed = gcm.seal(&nonce, &aad, &plaintext).context("encrypt")?;
    fs::write(output_path, &sealed).with_context(|| format!("write {}", output_path.display()))?;
    info!(
        plaintext_len = plaintext.len(),
        sealed_len = sealed.len(),
        "encrypted"
    );
    Ok(())
}

fn cmd_dec(
    key_hex: &str,
    nonce_hex: &str,
    aad_hex: &str,
    input_path: &PathBuf,
    output_path: &PathBuf,
) -> Result<()> {
    let gcm = session_from_hex(key_hex)?;
    let nonce = parse_hex("nonce", nonce_hex)?;
    let aad = parse_hex("aad", aad_hex)?;
    let sealed = fs::read(input_path).with_context(|| format!("read {}", input_path.display()))?;
    if sealed.len() < TAG_SIZE {
        bail!("input is shorter than the {TAG_SIZE}-byte tag");
    }

    let plaintext = match gcm.open(&nonce, &aad, &sealed) {
        Ok(plaintext) => plaintext,
        Err(GcmError::AuthenticationFailure) => {
            bail!("authentication failed; no output written")
        }
        Err(err) => return Err(err).context("decrypt"),
    };
    fs::write(output_path, &plaintext)
        .with_context(|| format!("write {}", output_path.display()))?;
    info!(plaintext_len = plaintext.len(), "decrypted");
    Ok(())
}

fn cmd_kat() -> Result<()> {
    run_kat()?;
    println!("sm4 block vector: ok");
    println!("sm4-gcm rfc8998 vector: ok");
    Ok(())
}

/// Published vectors: GB/T 32907 Appendix A and RFC 8998 Appendix A.1.
fn run_kat() -> Result<()> {
    let key_bytes = parse_hex("key", "0123456789abcdeffedcba9876543210")?;
    let cipher = Sm4::new_from_slice(&key_bytes).context("build cipher")?;
    let block: [u8; 16] = key_bytes
        .as_slice()
        .try_into()
        .context("16-byte plaintext")?;
    let ct = cipher.encrypt_block(&block);
    if hex::encode(ct) != "681edf34d206965e86b3e94f536e4246" {
        bail!("sm4 block vector mismatch: {}", hex::encode(ct));
    }
    if cipher.decrypt_block(&ct) != block {
        bail!("sm4 block vector does not decrypt");
    }

    let gcm = Sm4Gcm::new_from_slice(&key_bytes)?;
    let nonce = parse_hex("nonce", "00001234567800000000abcd")?;
    let aad = parse_hex("aad", "feedfacedeadbeeffeedfacedeadbeefabaddad2")?;
    let plaintext = parse_hex(
        "plaintext",
        "aaaaaaaaaaaaaaaabbbbbbbbbbbbbbbbccccccccccccccccdddddddddddddddd\
         eeeeeeeeeeeeeeeeffffffffffffffffeeeeeeeeeeeeeeeeaaaaaaaaaaaaaaaa",
    )?;
    let expected = "17f399f08c67d5ee19d0dc9969c4bb7d5fd46fd3756489069157b282bb200735\
                    d82710ca5c22f0ccfa7cbf93d496ac15a56834cbcf98c397b4024a2691233b8d\
                    83de3541e4c2b58177e065a9bf7b62ec";
    let sealed = gcm.seal(&nonce, &aad, &plaintext)?;
    if hex::encode(&sealed) != expected {
        bail!("sm4-gcm vector mismatch: {}", hex::encode(&sealed));
    }
    if gcm.open(&nonce, &aad, &sealed)? != plaintext {
        bail!("sm4-gcm vector does not decrypt");
    }
    debug!("known-answer vectors passed");
    Ok(())
}

fn cmd_demo(message: &str, seed: Option<u64>) -> Result<()> {
    let mut rng = seeded_rng(seed);
    let mut key_bytes = [0u8; 16];
    rng.fill_bytes(&mut key_bytes);
    let mut nonce = [0u8; NONCE_SIZE];
    rng.fill_bytes(&mut nonce);

    let gcm = Sm4Gcm::new(&Sm4Key::from(key_bytes));
    let aad = b"sm4gcm demo";
    let sealed = gcm.seal(&nonce, aad, message.as_bytes())?;
    let opened = gcm.open(&nonce, aad, &sealed)?;

    let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_SIZE);
    println!("demo key: {}", hex::encode(key_bytes));
    println!("nonce: {}", hex::encode(nonce));
    println!("plaintext: {}", hex::encode(message.as_bytes()));
    println!("ciphertext: {}", hex::encode(ciphertext));
    println!("tag: {}", hex::encode(tag));
    println!("decrypted: {}", hex::encode(&opened));
    if opened != message.as_bytes() {
        bail!("demo roundtrip failed");
    }

    let mut forged = sealed.clone();
    forged[0] ^= 1;
    match gcm.open(&nonce, aad, &forged) {
        Err(GcmError::AuthenticationFailure) => println!("forgery: rejected"),
        Ok(_) => bail!("forged ciphertext was accepted"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn session_from_hex(key_hex: &str) -> Result<Sm4Gcm> {
    let bytes = parse_hex("key", key_hex)?;
    if bytes.len() != 16 {
        bail!("SM4 key must be 16 bytes (32 hex characters)");
    }
    Ok(Sm4Gcm::new_from_slice(&bytes)?)
}

fn parse_hex(what: &str, hex_str: &str) -> Result<Vec<u8>> {
    hex::decode(hex_str.trim()).with_context(|| format!("decode {what} hex"))
}

fn seeded_rng(seed: Option<u64>) -> impl RngCore + CryptoRng {
    match seed {
        Some(value) => {
            let mut seed_bytes = [0u8; 32];
            seed_bytes[..8].copy_from_slice(&value.to_le_bytes());
            ChaCha20Rng::from_seed(seed_bytes)
        }
        None => {
            let mut seed_bytes = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut seed_bytes);
            ChaCha20Rng::from_seed(seed_bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_answer_vectors_pass() {
        run_kat().expect("vectors");
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(session_from_hex("00").is_err());
        assert!(session_from_hex("zz").is_err());
        assert!(session_from_hex("0123456789abcdeffedcba9876543210").is_ok());
        assert!(session_from_hex(" 0123456789abcdeffedcba9876543210\n").is_ok());
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = seeded_rng(Some(7));
        let mut b = seeded_rng(Some(7));
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn enc_dec_files_round_trip_and_reject_tampering() {
        let dir = std::env::temp_dir().join(format!("sm4gcm-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        let plain = dir.join("plain.bin");
        let sealed = dir.join("sealed.bin");
        let opened = dir.join("opened.bin");
        fs::write(&plain, b"file contents to protect").expect("write plaintext");

        let key = "0123456789abcdeffedcba9876543210";
        let nonce = "000102030405060708090a0b";
        cmd_enc(key, nonce, "abcd", &plain, &sealed).expect("enc");
        cmd_dec(key, nonce, "abcd", &sealed, &opened).expect("dec");
        assert_eq!(
            fs::read(&opened).expect("read"),
            b"file contents to protect"
        );

        fs::remove_file(&opened).expect("cleanup");
        let err = cmd_dec(key, nonce, "abce", &sealed, &opened).unwrap_err();
        assert!(err.to_string().contains("authentication failed"));
        assert!(!opened.exists());

        fs::remove_dir_all(&dir).expect("cleanup");
    }
}
