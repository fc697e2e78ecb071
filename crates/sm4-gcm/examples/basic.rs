//! Encrypts a message with SM4-GCM and opens it again.

use sm4_gcm::{Error, Sm4Gcm, Sm4Key};

fn main() -> Result<(), Error> {
    // Fixed key and nonce so the output is reproducible; never reuse a nonce in practice.
    let key = Sm4Key::from([
        0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0xfe, 0xdc, 0xba, 0x98, 0x76, 0x54, 0x32,
        0x10,
    ]);
    let nonce = [0u8; 12];
    let gcm = Sm4Gcm::new(&key);

    let (ciphertext, tag) = gcm.encrypt(&nonce, b"header", b"hello, sm4-gcm")?;
    let plaintext = gcm.decrypt(&nonce, b"header", &ciphertext, &tag)?;
    assert_eq!(plaintext, b"hello, sm4-gcm");

    let mut forged = tag;
    forged[0] ^= 1;
    assert_eq!(
        gcm.decrypt(&nonce, b"header", &ciphertext, &forged),
        Err(Error::AuthenticationFailure)
    );

    println!("example succeeded; forged tag rejected");
    Ok(())
}
