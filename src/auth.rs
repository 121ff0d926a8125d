use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

const PASSWORD_ENV: &str = "PWSEAL_PASSWORD";

/// Reads the password for an existing envelope or message.
///
/// `stdin_free` is false when stdin carries the payload itself, in which
/// case only the environment and the TTY are consulted.
pub fn read_password(stdin_free: bool) -> Result<Zeroizing<String>> {
    //  Environment Variable
    //  PWSEAL_PASSWORD="supersecret" pwseal verify <hex>
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    //  stdin (Pipeline)
    //  echo "supersecret" | pwseal verify <hex>
    if stdin_free && !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_line(&mut buf)?;
        trim_newline(&mut buf);

        if !buf.is_empty() {
            return Ok(buf);
        }
    }

    //  Interactive (TTY)
    if io::stdin().is_terminal() {
        let pw = Zeroizing::new(rpassword::prompt_password("Password: ")?);
        if !pw.is_empty() {
            return Ok(pw);
        }
    }

    bail!("No password provided")
}

/// Reads a password that is about to protect something new; prompts twice
/// on a TTY.
pub fn read_new_password(stdin_free: bool) -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    if !io::stdin().is_terminal() {
        if !stdin_free {
            bail!("No password provided; set {PASSWORD_ENV} when piping data");
        }

        let stdin = io::stdin();
        let mut handle = stdin.lock();

        let mut pw = Zeroizing::new(String::new());
        handle.read_line(&mut pw)?;
        trim_newline(&mut pw);

        if pw.is_empty() {
            bail!("password cannot be empty");
        }

        return Ok(pw);
    }

    let pw1 = Zeroizing::new(rpassword::prompt_password("New password: ")?);
    let pw2 = Zeroizing::new(rpassword::prompt_password("Confirm password: ")?);

    if pw1.is_empty() {
        bail!("password cannot be empty");
    }

    if pw1 != pw2 {
        bail!("passwords do not match");
    }

    Ok(pw1)
}

fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
