//! Plain-text share flow.
//!
//! Desktop Linux has no share sheet, so the chooser is a user-configured
//! command (`wl-copy`, `mail -s ...`, a rofi script) that receives the
//! text on stdin. With no command the text is printed to stdout.
//!
//! The chooser may stay open for as long as the user likes, so `share`
//! only spawns it. Feeding stdin and waiting for the exit happen on the
//! blocking pool, and a failed exit is reported as a notice afterwards.

use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{NotificationService, ShareRequest, ShareService};
use crate::config::ShareConfig;
use crate::error::PlatformError;
use crate::session::NOTICE_FETCH_FAILED;

pub struct CommandShare {
    command: Vec<String>,
    notifier: Arc<dyn NotificationService>,
}

impl CommandShare {
    pub fn new(config: &ShareConfig, notifier: Arc<dyn NotificationService>) -> Self {
        Self {
            command: config.command.clone(),
            notifier,
        }
    }

    /// Spawn the share command. Must be called within a tokio runtime.
    fn pipe_to_command(&self, program: &str, args: &[String], request: &ShareRequest) -> Result<(), PlatformError> {
        let child = Command::new(program)
            .args(args)
            .env("QUOTIFY_SHARE_TITLE", &request.title)
            .env("QUOTIFY_SHARE_MIME", &request.mime_type)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| PlatformError::new(format!("Failed to spawn {program}: {e}")))?;
        debug!("Spawned share command {program} (pid {})", child.id());

        let program = program.to_string();
        let text = request.text.clone();
        let notifier = self.notifier.clone();
        tokio::task::spawn_blocking(move || match feed_and_wait(child, &program, &text) {
            Ok(()) => info!("Shared quote via {program}"),
            Err(e) => {
                warn!("Share failed: {e}");
                notifier.notify(NOTICE_FETCH_FAILED);
            }
        });
        Ok(())
    }
}

fn feed_and_wait(mut child: Child, program: &str, text: &str) -> Result<(), PlatformError> {
    if let Some(mut stdin) = child.stdin.take() {
        let written = stdin.write_all(text.as_bytes());
        // The command only sees end of input once stdin is closed.
        drop(stdin);
        if let Err(e) = written {
            let _ = child.wait();
            return Err(PlatformError::new(format!("Failed to write to {program}: {e}")));
        }
    }

    let status = child
        .wait()
        .map_err(|e| PlatformError::new(format!("{program} failed: {e}")))?;
    if !status.success() {
        return Err(PlatformError::new(format!("{program} exited with {status}")));
    }
    Ok(())
}

impl ShareService for CommandShare {
    fn share(&mut self, request: &ShareRequest) -> Result<(), PlatformError> {
        debug!("Share '{}' ({})", request.title, request.mime_type);

        match self.command.split_first() {
            Some((program, args)) => self.pipe_to_command(program, args, request),
            None => {
                println!("{}:\n{}", request.title, request.text);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct Notices(Mutex<Vec<String>>);

    impl NotificationService for Notices {
        fn notify(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    fn request(text: &str) -> ShareRequest {
        ShareRequest {
            title: "Share Quote".into(),
            mime_type: "text/plain".into(),
            text: text.into(),
        }
    }

    fn shell_share(script: String, notices: &Arc<Notices>) -> CommandShare {
        CommandShare::new(
            &ShareConfig {
                command: vec!["sh".into(), "-c".into(), script],
            },
            notices.clone(),
        )
    }

    /// Poll until `done` holds, giving the reaper task time to run.
    async fn wait_for(mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if done() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        done()
    }

    #[tokio::test]
    async fn pipes_text_into_command() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("shared.txt");
        let done = dir.path().join("done");
        let notices = Arc::new(Notices::default());
        let mut share = shell_share(
            format!("cat > '{}'; touch '{}'", out.display(), done.display()),
            &notices,
        );

        share.share(&request("A - B")).unwrap();
        assert!(wait_for(|| done.exists()).await);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "A - B");
        assert!(notices.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn long_running_command_does_not_block_caller() {
        let notices = Arc::new(Notices::default());
        let mut share = shell_share("cat > /dev/null; sleep 2".into(), &notices);

        let started = Instant::now();
        share.share(&request("A - B")).unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn failing_command_is_reported_as_notice() {
        let notices = Arc::new(Notices::default());
        let mut share = shell_share("cat > /dev/null; exit 3".into(), &notices);

        share.share(&request("A - B")).unwrap();
        assert!(wait_for(|| !notices.0.lock().unwrap().is_empty()).await);
        assert_eq!(*notices.0.lock().unwrap(), vec![NOTICE_FETCH_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn missing_program_fails_immediately() {
        let notices = Arc::new(Notices::default());
        let mut share = CommandShare::new(
            &ShareConfig {
                command: vec!["/nonexistent/quotify-share".into()],
            },
            notices.clone(),
        );
        assert!(share.share(&request("A - B")).is_err());
    }

    #[test]
    fn empty_command_prints() {
        let notices = Arc::new(Notices::default());
        let mut share = CommandShare::new(&ShareConfig::default(), notices);
        assert!(share.share(&request("A - B")).is_ok());
    }
}
