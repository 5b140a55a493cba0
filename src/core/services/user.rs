use crate::core::forms::SignupForm;
use crate::core::models::user::{Insert as UserInsert, User};
use crate::core::ports::repository::{Store, UserCommon};
use crate::error::Error;
use hex::ToHex;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};

const SALT_LENGTH: usize = 32;

pub fn hash_password(pass: &str, slt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pass);
    hasher.update(slt);
    hasher.finalize().encode_hex()
}

fn random_salt() -> String {
    thread_rng().sample_iter(&Alphanumeric).take(SALT_LENGTH).map(char::from).collect()
}

pub async fn signup<S>(store: &mut S, form: SignupForm) -> Result<i32, Error>
where
    S: Store,
{
    let mut errors = form.validate();
    let username = form.username.trim().to_owned();
    if errors.get("username").is_none() && UserCommon::exists(store, &username).await? {
        errors.add("username", "A user with that username already exists.");
    }
    errors.into_result(&form)?;
    let slt = random_salt();
    let id = UserCommon::insert(
        store,
        UserInsert {
            username,
            password: hash_password(&form.password1, &slt),
            salt: slt,
        },
    )
    .await?;
    log::info!("user {} signed up", id);
    Ok(id)
}

pub async fn authenticate<S>(store: &mut S, username: &str, password: &str) -> Result<User, Error>
where
    S: Store,
{
    match UserCommon::get_by_username(store, username.trim()).await? {
        Some(user) if hash_password(password, &user.salt) == user.password => Ok(user),
        _ => Err(Error::Unauthorized),
    }
}
