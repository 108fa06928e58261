mod crypto;

pub use crypto::{
    SodiumCiphertext, SodiumNonce, SodiumPrivateKey, SodiumPubKey, SODIUM_NONCE_SIZE,
    SODIUM_PUBLIC_KEY_SIZE,
};
