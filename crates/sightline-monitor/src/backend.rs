//! 접근성 백엔드 구현.
//!
//! - `CommandAccessibilityBackend`: 외부 도우미 명령이 stdout으로 JSON 트리 출력
//! - `UnsupportedBackend`: 백엔드가 없는 환경, 항상 빈 트리
//!
//! 도우미 종료 코드 규약 (sysexits): 0 성공, 66 앱 없음, 77 권한 없음.

use std::time::Duration;

use async_trait::async_trait;
use sightline_core::error::CoreError;
use tokio::process::Command;
use tracing::debug;

use crate::accessibility::{AccessibilityBackend, AccessibilityNode};

/// 앱 없음 (EX_NOINPUT)
const EXIT_NOT_FOUND: i32 = 66;

/// 권한 없음 (EX_NOPERM)
const EXIT_PERMISSION_DENIED: i32 = 77;

/// 외부 명령 기반 접근성 백엔드
///
/// `helper_command`를 공백으로 나눠 실행하고 마지막 인자로 앱 식별자를 붙인다.
#[derive(Debug, Clone)]
pub struct CommandAccessibilityBackend {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandAccessibilityBackend {
    /// 명령 문자열로 생성. 빈 문자열이면 None
    pub fn from_command_line(command: &str, timeout: Duration) -> Option<Self> {
        let mut parts = command.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            timeout,
        })
    }
}

/// 도우미 출력 해석
pub fn interpret_output(
    app_id: &str,
    exit_code: Option<i32>,
    stdout: &[u8],
    stderr: &[u8],
) -> Result<Option<AccessibilityNode>, CoreError> {
    match exit_code {
        Some(0) => {
            let text = String::from_utf8_lossy(stdout);
            let text = text.trim();
            if text.is_empty() || text == "null" {
                return Ok(None);
            }
            serde_json::from_str::<AccessibilityNode>(text)
                .map(Some)
                .map_err(|e| CoreError::Accessibility(format!("도우미 JSON 파싱 실패: {e}")))
        }
        Some(EXIT_NOT_FOUND) => Err(CoreError::NotFound {
            resource_type: "application".to_string(),
            id: app_id.to_string(),
        }),
        Some(EXIT_PERMISSION_DENIED) => Err(CoreError::PermissionDenied(
            String::from_utf8_lossy(stderr).trim().to_string(),
        )),
        code => Err(CoreError::Accessibility(format!(
            "도우미 실패 (code={:?}): {}",
            code,
            String::from_utf8_lossy(stderr).trim()
        ))),
    }
}

#[async_trait]
impl AccessibilityBackend for CommandAccessibilityBackend {
    async fn dump(&self, app_id: &str) -> Result<Option<AccessibilityNode>, CoreError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(app_id)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| CoreError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            })?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CoreError::Accessibility(format!("도우미 명령 없음: {}", self.program))
                } else {
                    CoreError::Io(e)
                }
            })?;

        debug!(
            "접근성 도우미 완료: {} ({}바이트)",
            self.program,
            output.stdout.len()
        );
        interpret_output(app_id, output.status.code(), &output.stdout, &output.stderr)
    }

    fn name(&self) -> &str {
        "command"
    }
}

/// 접근성 백엔드가 없는 환경
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedBackend;

#[async_trait]
impl AccessibilityBackend for UnsupportedBackend {
    async fn dump(&self, _app_id: &str) -> Result<Option<AccessibilityNode>, CoreError> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "unsupported"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn command_line_is_split() {
        let backend =
            CommandAccessibilityBackend::from_command_line("ax-dump --json", Duration::from_secs(1))
                .unwrap();
        assert_eq!(backend.program, "ax-dump");
        assert_eq!(backend.args, vec!["--json"]);
        assert!(CommandAccessibilityBackend::from_command_line("  ", Duration::from_secs(1)).is_none());
    }

    #[test]
    fn exit_codes_map_to_errors() {
        assert_matches!(interpret_output("a", Some(0), b"", b""), Ok(None));
        assert_matches!(interpret_output("a", Some(0), b"null\n", b""), Ok(None));
        assert_matches!(
            interpret_output("a", Some(66), b"", b""),
            Err(CoreError::NotFound { .. })
        );
        assert_matches!(
            interpret_output("a", Some(77), b"", b"not trusted"),
            Err(CoreError::PermissionDenied(msg)) if msg == "not trusted"
        );
        assert_matches!(
            interpret_output("a", Some(1), b"", b"boom"),
            Err(CoreError::Accessibility(_))
        );
        assert_matches!(
            interpret_output("a", Some(0), b"{not json", b""),
            Err(CoreError::Accessibility(_))
        );
    }

    #[test]
    fn valid_json_tree_is_parsed() {
        let json = br#"{"role":"AXWindow","children":[{"role":"AXButton","label":"OK"}]}"#;
        let tree = interpret_output("a", Some(0), json, b"").unwrap().unwrap();
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].label.as_deref(), Some("OK"));
    }

    #[tokio::test]
    async fn missing_helper_binary_is_an_error() {
        let backend = CommandAccessibilityBackend::from_command_line(
            "sightline-nonexistent-helper-binary",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_matches!(backend.dump("app").await, Err(CoreError::Accessibility(_)));
    }

    #[tokio::test]
    async fn unsupported_backend_returns_none() {
        assert_matches!(UnsupportedBackend.dump("app").await, Ok(None));
    }
}
