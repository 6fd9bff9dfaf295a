/// Where the operator is sent when the session ends involuntarily.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self, reason: &str);
}

/// Prints a login hint on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn redirect_to_login(&self, reason: &str) {
        eprintln!("{} Run `admin-console login` to sign in again.", reason);
    }
}
