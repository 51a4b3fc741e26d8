use remote::RemoteError;

/// Render an error for stderr, one line per cause
pub fn format_error(err: &anyhow::Error) -> String {
    if let Some(remote) = err.downcast_ref::<RemoteError>() {
        return format!("error: {}", remote);
    }

    let mut message = format!("error: {}", err);
    for cause in err.chain().skip(1) {
        message.push_str(&format!("\n  caused by: {}", cause));
    }
    message
}

/// Exit code the process should end with for `err`
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<RemoteError>()
        .map(RemoteError::exit_code)
        .unwrap_or(1)
}

/// Print `err` and return the exit code for it
pub fn report(err: &anyhow::Error) -> i32 {
    eprintln!("{}", format_error(err));
    exit_code(err)
}
