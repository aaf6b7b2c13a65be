//! 접근성 트리 추출기.
//!
//! 백엔드가 돌려준 중첩 트리를 깊이 우선으로 평탄화해 `UiElement` 목록을 만든다.
//! 좌표는 전역 화면 좌표에서 프레임 픽셀 좌표로 변환한다.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sightline_core::config::{TreeDepth, UiTreeConfig};
use sightline_core::error::CoreError;
use sightline_core::models::geometry::{Point, Rect};
use sightline_core::models::ui::UiElement;
use sightline_core::ports::ui_tree::UiTreeExtractor;
use tracing::{debug, warn};

use crate::roles::map_platform_role;

/// 백엔드가 반환하는 접근성 노드 (중첩 트리)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityNode {
    /// 플랫폼 원본 역할 문자열
    pub role: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    /// 전역 화면 좌표 기준 경계. 없으면 화면에 배치되지 않은 노드
    #[serde(default)]
    pub bounds: Option<Rect>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub children: Vec<AccessibilityNode>,
}

/// 접근성 트리 백엔드
#[async_trait]
pub trait AccessibilityBackend: Send + Sync {
    /// 앱의 접근성 트리 루트. 앱을 찾을 수 없으면 `Ok(None)`
    async fn dump(&self, app_id: &str) -> Result<Option<AccessibilityNode>, CoreError>;

    /// 백엔드 이름 (로그용)
    fn name(&self) -> &str;
}

/// 전역 좌표 → 프레임 픽셀 좌표 변환
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    /// 캡처 모니터 원점 (전역 좌표)
    pub origin: Point,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl CoordinateTransform {
    pub fn identity() -> Self {
        Self {
            origin: Point::default(),
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn apply(&self, rect: Rect) -> Rect {
        Rect::new(
            (rect.x - self.origin.x) * self.scale_x,
            (rect.y - self.origin.y) * self.scale_y,
            rect.width * self.scale_x,
            rect.height * self.scale_y,
        )
    }
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// 트리를 깊이 우선(전위)으로 평탄화.
///
/// 경로는 형제 중 같은 역할의 순번으로 만든다 (`AXWindow[0]/AXGroup[1]/AXButton[0]`).
/// 경계가 없는 노드는 결과에서 빠지지만 자식은 계속 탐색한다.
pub fn flatten_tree(
    root: &AccessibilityNode,
    depth_mode: TreeDepth,
    max_nodes: usize,
    transform: &CoordinateTransform,
) -> Vec<UiElement> {
    let mut out = Vec::new();
    let mut stack: Vec<(&AccessibilityNode, u32, String)> =
        vec![(root, 0, segment(&root.role, 0))];

    while let Some((node, depth, path)) = stack.pop() {
        if out.len() >= max_nodes {
            debug!("접근성 노드 상한 도달: {}", max_nodes);
            break;
        }

        let role = map_platform_role(&node.role);
        let keep = match depth_mode {
            TreeDepth::Interactive => role.is_interactive(),
            TreeDepth::Complete => true,
        };

        if let (true, Some(bounds)) = (keep, node.bounds) {
            out.push(UiElement {
                role,
                platform_role: node.role.clone(),
                label: non_blank(&node.label),
                value: non_blank(&node.value),
                bounds: transform.apply(bounds),
                enabled: node.enabled,
                depth,
                path: path.clone(),
            });
        }

        let mut seen: Vec<(&str, usize)> = Vec::new();
        let mut children = Vec::with_capacity(node.children.len());
        for child in &node.children {
            let index = match seen.iter_mut().find(|(r, _)| *r == child.role) {
                Some((_, n)) => {
                    *n += 1;
                    *n - 1
                }
                None => {
                    seen.push((child.role.as_str(), 1));
                    0
                }
            };
            children.push((child, depth + 1, format!("{}/{}", path, segment(&child.role, index))));
        }
        // 전위 순서 유지를 위해 역순으로 push
        stack.extend(children.into_iter().rev());
    }

    out
}

fn segment(role: &str, index: usize) -> String {
    let role = if role.is_empty() { "Unknown" } else { role };
    format!("{role}[{index}]")
}

fn non_blank(s: &Option<String>) -> Option<String> {
    s.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// 접근성 트리 기반 UI 트리 추출기: `UiTreeExtractor` 포트 구현
pub struct AccessibilityTreeExtractor {
    backend: Arc<dyn AccessibilityBackend>,
    config: UiTreeConfig,
    transform: CoordinateTransform,
}

impl AccessibilityTreeExtractor {
    pub fn new(backend: Arc<dyn AccessibilityBackend>, config: UiTreeConfig) -> Self {
        Self {
            backend,
            config,
            transform: CoordinateTransform::identity(),
        }
    }

    pub fn with_transform(mut self, transform: CoordinateTransform) -> Self {
        self.transform = transform;
        self
    }
}

#[async_trait]
impl UiTreeExtractor for AccessibilityTreeExtractor {
    async fn extract(&self, app_id: &str) -> Result<Vec<UiElement>, CoreError> {
        let root = match self.backend.dump(app_id).await {
            Ok(Some(root)) => root,
            Ok(None) => {
                debug!("접근성 트리 없음: {}", app_id);
                return Ok(Vec::new());
            }
            Err(CoreError::NotFound { .. }) => {
                debug!("앱을 찾을 수 없음: {}", app_id);
                return Ok(Vec::new());
            }
            Err(CoreError::PermissionDenied(msg)) => {
                warn!(backend = self.backend.name(), "접근성 권한 없음: {}", msg);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let elements = flatten_tree(
            &root,
            self.config.depth,
            self.config.max_nodes,
            &self.transform,
        );
        debug!(
            backend = self.backend.name(),
            app_id,
            count = elements.len(),
            "UI 트리 추출 완료"
        );
        Ok(elements)
    }

    fn name(&self) -> &str {
        self.backend.name()
    }
}
