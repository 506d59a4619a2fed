//! Throwaway account e-mails.

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

/// Domain of generated addresses
pub const EMAIL_DOMAIN: &str = "example.com";

/// Length of the random local part
pub const LOCAL_PART_LEN: usize = 8;

/// Random address `[a-z]{8}@example.com`
#[must_use]
pub fn random_email() -> String {
    random_email_with(&mut rand::thread_rng())
}

/// Random address drawn from `rng`
pub fn random_email_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let letters = Uniform::new_inclusive(b'a', b'z');
    let local: String = (0..LOCAL_PART_LEN)
        .map(|_| char::from(letters.sample(&mut *rng)))
        .collect();
    format!("{local}@{EMAIL_DOMAIN}")
}
