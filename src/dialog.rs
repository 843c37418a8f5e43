/// User-facing notices. Fire-and-forget: nothing is returned to the caller.
pub trait DialogService {
    fn show_message(&self, text: &str, title: &str);
}

/// Prints notices to stderr, keeping stdout for command output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleDialog;

impl DialogService for ConsoleDialog {
    fn show_message(&self, text: &str, title: &str) {
        eprintln!("[{title}] {text}");
    }
}
