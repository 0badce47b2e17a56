use crate::error::{Error, Result};
use crate::models::{DetachedLaunch, ExecutionResult, OutputLine, OutputStream};
use crate::services::output_sink::OutputSink;
use chrono::Utc;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::debug;

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x08000000;
#[cfg(target_os = "windows")]
const DETACHED_PROCESS: u32 = 0x00000008;
#[cfg(target_os = "windows")]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x00000200;

/// Spawns pmon invocations and transcribes them to an [`OutputSink`].
#[derive(Clone)]
pub struct ProcessExecutor {
    sink: Arc<dyn OutputSink>,
}

impl ProcessExecutor {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self { sink }
    }

    /// Runs to completion and returns the exit code with both streams.
    ///
    /// No timeout is applied; the call ends only when the child exits.
    pub async fn run(
        &self,
        program: &Path,
        args: &[String],
        cwd: Option<&Path>,
        project_name: Option<&str>,
    ) -> Result<ExecutionResult> {
        let invocation_id = uuid::Uuid::new_v4().to_string();
        let project_name = project_name.map(str::to_string);
        self.emit(
            &invocation_id,
            &project_name,
            OutputStream::Command,
            command_line(program, args),
        );

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }
        #[cfg(target_os = "windows")]
        command.creation_flags(CREATE_NO_WINDOW);

        let mut child = command
            .spawn()
            .map_err(|e| self.spawn_error(&invocation_id, &project_name, program, e))?;

        let stdout_task = child.stdout.take().map(|stdout| {
            self.collect_stream(
                stdout,
                invocation_id.clone(),
                project_name.clone(),
                OutputStream::Stdout,
            )
        });
        let stderr_task = child.stderr.take().map(|stderr| {
            self.collect_stream(
                stderr,
                invocation_id.clone(),
                project_name.clone(),
                OutputStream::Stderr,
            )
        });

        let status = child.wait().await?;
        let stdout = join_stream(stdout_task).await;
        let stderr = join_stream(stderr_task).await;

        let exit_code = match status.code() {
            Some(code) => code,
            None => {
                self.emit(
                    &invocation_id,
                    &project_name,
                    OutputStream::Exit,
                    "terminated by signal".to_string(),
                );
                return Err(Error::Terminated {
                    program: program.display().to_string(),
                });
            }
        };

        self.emit(
            &invocation_id,
            &project_name,
            OutputStream::Exit,
            format!("exit code {}", exit_code),
        );

        Ok(ExecutionResult {
            invocation_id,
            exit_code,
            stdout,
            stderr,
        })
    }

    /// Starts the child and returns as soon as it is spawned.
    ///
    /// The child is put in its own process group and released; it keeps
    /// running after this client exits and cannot be queried or stopped
    /// through it.
    pub async fn spawn_detached(
        &self,
        program: &Path,
        args: &[String],
        cwd: Option<&Path>,
        project_name: Option<&str>,
    ) -> Result<DetachedLaunch> {
        let invocation_id = uuid::Uuid::new_v4().to_string();
        let project_name = project_name.map(str::to_string);
        self.emit(
            &invocation_id,
            &project_name,
            OutputStream::Command,
            format!("{} (detached)", command_line(program, args)),
        );

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false);
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }
        #[cfg(unix)]
        command.process_group(0);
        #[cfg(target_os = "windows")]
        command.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);

        let child = command
            .spawn()
            .map_err(|e| self.spawn_error(&invocation_id, &project_name, program, e))?;
        let pid = child.id();
        // tokio reaps the dropped child in the background
        drop(child);

        self.emit(
            &invocation_id,
            &project_name,
            OutputStream::Exit,
            match pid {
                Some(pid) => format!("spawned detached, pid {}", pid),
                None => "spawned detached".to_string(),
            },
        );

        Ok(DetachedLaunch {
            invocation_id,
            pid,
            started_at: Utc::now(),
        })
    }

    fn collect_stream<R>(
        &self,
        stream: R,
        invocation_id: String,
        project_name: Option<String>,
        kind: OutputStream,
    ) -> JoinHandle<String>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let sink = self.sink.clone();
        tokio::spawn(async move {
            let mut reader = BufReader::new(stream);
            let mut collected = String::new();
            let mut buf = Vec::new();

            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let chunk = String::from_utf8_lossy(&buf);
                        collected.push_str(&chunk);
                        sink.append(&OutputLine {
                            invocation_id: invocation_id.clone(),
                            project_name: project_name.clone(),
                            stream: kind,
                            message: chunk.trim_end_matches(['\r', '\n']).to_string(),
                        });
                    }
                    Err(e) => {
                        debug!("Stopped reading {:?}: {}", kind, e);
                        break;
                    }
                }
            }

            collected
        })
    }

    /// Transcribes an invocation that failed before any process was spawned.
    pub fn report_unstarted(&self, args: &[String], project_name: Option<&str>, error: &Error) {
        let invocation_id = uuid::Uuid::new_v4().to_string();
        let project_name = project_name.map(str::to_string);
        self.emit(
            &invocation_id,
            &project_name,
            OutputStream::Command,
            args.join(" "),
        );
        self.emit(
            &invocation_id,
            &project_name,
            OutputStream::Exit,
            format!("not started: {}", error),
        );
    }

    fn spawn_error(
        &self,
        invocation_id: &str,
        project_name: &Option<String>,
        program: &Path,
        source: std::io::Error,
    ) -> Error {
        self.emit(
            invocation_id,
            project_name,
            OutputStream::Exit,
            format!("spawn failed: {}", source),
        );
        Error::Spawn {
            program: program.display().to_string(),
            source,
        }
    }

    fn emit(
        &self,
        invocation_id: &str,
        project_name: &Option<String>,
        stream: OutputStream,
        message: String,
    ) {
        self.sink.append(&OutputLine {
            invocation_id: invocation_id.to_string(),
            project_name: project_name.clone(),
            stream,
            message,
        });
    }
}

async fn join_stream(task: Option<JoinHandle<String>>) -> String {
    match task {
        Some(task) => task.await.unwrap_or_default(),
        None => String::new(),
    }
}

pub fn command_line(program: &Path, args: &[String]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        if arg.contains(' ') {
            line.push('"');
            line.push_str(arg);
            line.push('"');
        } else {
            line.push_str(arg);
        }
    }
    line
}
