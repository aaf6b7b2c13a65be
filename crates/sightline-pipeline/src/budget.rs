//! 예산 컨트롤러.
//!
//! 사이클 시작 후 경과 시간으로 설명 전략을 고르는 순수 함수.
//! 사이클 간 상태를 갖지 않는다.
//!
//! | 경과 시간 `t`              | 전략     |
//! |---------------------------|----------|
//! | `t < enrich`              | `Enrich` |
//! | `enrich <= t < base`      | `Base`   |
//! | `t >= base`               | `Fast`   |

use std::time::Duration;

use sightline_core::config::BudgetConfig;
use sightline_core::models::context::DescriptionStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetController {
    enrich: Duration,
    base: Duration,
}

impl BudgetController {
    /// 임계값 직접 지정. `enrich > base`이면 `enrich`를 `base`로 낮춘다
    pub fn new(enrich: Duration, base: Duration) -> Self {
        Self {
            enrich: enrich.min(base),
            base,
        }
    }

    /// 캡처 주기 대비 비율로 생성
    pub fn from_config(config: &BudgetConfig, interval: Duration) -> Self {
        let (enrich, base) = config.thresholds(interval);
        Self::new(enrich, base)
    }

    pub fn select(&self, elapsed: Duration) -> DescriptionStrategy {
        if elapsed < self.enrich {
            DescriptionStrategy::Enrich
        } else if elapsed < self.base {
            DescriptionStrategy::Base
        } else {
            DescriptionStrategy::Fast
        }
    }

    pub fn enrich_threshold(&self) -> Duration {
        self.enrich
    }

    pub fn base_threshold(&self) -> Duration {
        self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> BudgetController {
        BudgetController::from_config(&BudgetConfig::default(), Duration::from_millis(1_000))
    }

    #[test]
    fn thresholds_from_default_config() {
        let c = controller();
        assert_eq!(c.enrich_threshold(), Duration::from_millis(500));
        assert_eq!(c.base_threshold(), Duration::from_millis(900));
    }

    #[test]
    fn straddling_enrich_threshold() {
        let c = controller();
        assert_eq!(c.select(Duration::from_millis(499)), DescriptionStrategy::Enrich);
        assert_eq!(c.select(Duration::from_millis(500)), DescriptionStrategy::Base);
        assert_eq!(c.select(Duration::from_millis(501)), DescriptionStrategy::Base);
    }

    #[test]
    fn straddling_base_threshold() {
        let c = controller();
        assert_eq!(c.select(Duration::from_millis(899)), DescriptionStrategy::Base);
        assert_eq!(c.select(Duration::from_millis(900)), DescriptionStrategy::Fast);
        assert_eq!(c.select(Duration::from_secs(5)), DescriptionStrategy::Fast);
    }

    #[test]
    fn zero_elapsed_enriches() {
        assert_eq!(controller().select(Duration::ZERO), DescriptionStrategy::Enrich);
    }

    #[test]
    fn inverted_thresholds_are_clamped() {
        let c = BudgetController::new(Duration::from_millis(1_500), Duration::from_millis(900));
        assert_eq!(c.enrich_threshold(), Duration::from_millis(900));
        assert_eq!(c.select(Duration::from_millis(899)), DescriptionStrategy::Enrich);
        assert_eq!(c.select(Duration::from_millis(900)), DescriptionStrategy::Fast);
    }
}
