use rand::Rng;

use crate::entities::prize_entity as prizes;
use crate::error::{AppError, AppResult};

/// 加权随机抽取。
///
/// 权重按奖品表总权重归一化, 总和不要求等于 1.0 (低于 1.0 的余量是
/// 刻意保留的 RTP 空间, 不是配置错误)。每次抽取彼此独立, 不保留任何
/// 跨调用状态。传入的奖品表只应包含可抽取奖品, 过滤橱窗奖品是目录层
/// 的职责。

/// 奖品表总权重
pub fn total_weight(table: &[prizes::Model]) -> f64 {
    table.iter().map(|p| p.weight).sum()
}

/// 在 [0, total) 上取样 r 后选取奖品: 沿奖品表累加权重, 返回第一个
/// 累计权重 >= r 的奖品。
///
/// 浮点累加顺序可能导致 r 恰好落在所有累计值之外; 此时确定性地回退
/// 到表中最后一个奖品。该回退保证本函数对非空表永远返回奖品, 属于
/// 契约的一部分, 不允许"修掉"。
pub fn pick<'a>(table: &'a [prizes::Model], r: f64) -> &'a prizes::Model {
    debug_assert!(!table.is_empty());
    let mut acc = 0.0;
    for prize in table {
        acc += prize.weight;
        if r < acc {
            return prize;
        }
    }
    // fallback
    table.last().expect("non-empty prize table")
}

/// 一次抽取 (显式传入随机源, 便于测试)
pub fn draw_with_rng<'a, R: Rng>(
    rng: &mut R,
    table: &'a [prizes::Model],
) -> AppResult<&'a prizes::Model> {
    if table.is_empty() {
        return Err(AppError::ConfigurationError(
            "Prize table is empty".to_string(),
        ));
    }
    let total = total_weight(table);
    if total <= 0.0 {
        return Err(AppError::ConfigurationError(
            "Prize table total weight is not positive".to_string(),
        ));
    }
    let r = rng.gen_range(0.0..total);
    Ok(pick(table, r))
}

/// 一次抽取 (线程本地随机源)
pub fn draw(table: &[prizes::Model]) -> AppResult<&prizes::Model> {
    draw_with_rng(&mut rand::thread_rng(), table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::AccountMode;

    fn prize(id: i64, value_cents: i64, weight: f64) -> prizes::Model {
        prizes::Model {
            id,
            box_id: 1,
            mode: AccountMode::Real,
            name: format!("prize-{id}"),
            value_cents,
            weight,
            is_drawable: true,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_empty_table_is_configuration_error() {
        let err = draw(&[]).unwrap_err();
        assert!(matches!(err, AppError::ConfigurationError(_)));
    }

    #[test]
    fn test_zero_total_weight_is_configuration_error() {
        let table = vec![prize(1, 100, 0.0), prize(2, 200, 0.0)];
        let err = draw(&table).unwrap_err();
        assert!(matches!(err, AppError::ConfigurationError(_)));
    }

    #[test]
    fn test_pick_walks_cumulative_weights() {
        let table = vec![prize(1, 0, 0.5), prize(2, 0, 0.3), prize(3, 0, 0.2)];
        assert_eq!(pick(&table, 0.0).id, 1);
        assert_eq!(pick(&table, 0.49).id, 1);
        assert_eq!(pick(&table, 0.5).id, 2);
        assert_eq!(pick(&table, 0.79).id, 2);
        assert_eq!(pick(&table, 0.8).id, 3);
        assert_eq!(pick(&table, 0.9999).id, 3);
    }

    // 权重总和不足 1.0 的表在 r 贴边时也必须返回奖品 (回退到最后一项)
    #[test]
    fn test_fallback_returns_last_prize_at_extreme_boundary() {
        let table = vec![prize(1, 0, 0.5), prize(2, 0, 0.5 - 1e-12)];
        let total = total_weight(&table);
        // r 为取样域内可表示的最大值
        let r = f64::from_bits(total.to_bits() - 1);
        let chosen = pick(&table, r);
        assert_eq!(chosen.id, 2);
        // 即使 r 因上游舍入越过 total, 仍然返回最后一项而不是失败
        assert_eq!(pick(&table, total).id, 2);
        assert_eq!(pick(&table, total + 1.0).id, 2);
    }

    // 100k 次抽取, 观测频率与权重偏差在 1 个百分点以内
    #[test]
    fn test_draw_distribution_follows_weights() {
        let table = vec![
            prize(1, 0, 0.5),
            prize(2, 0, 0.3),
            prize(3, 0, 0.1),
            prize(4, 0, 0.1),
        ];
        let mut counts = [0u32; 4];
        let mut rng = rand::thread_rng();
        let n = 100_000;
        for _ in 0..n {
            let p = draw_with_rng(&mut rng, &table).unwrap();
            counts[(p.id - 1) as usize] += 1;
        }
        let expected = [0.5, 0.3, 0.1, 0.1];
        for (count, want) in counts.iter().zip(expected.iter()) {
            let observed = *count as f64 / n as f64;
            assert!(
                (observed - want).abs() < 0.01,
                "observed {observed} vs expected {want}"
            );
        }
    }

    // 归一化按总权重进行: 总和为 0.66 的表中权重 0.33 的两项各占一半
    #[test]
    fn test_sub_unit_weight_sum_is_normalized_by_total() {
        let table = vec![prize(1, 0, 0.33), prize(2, 0, 0.33)];
        let mut counts = [0u32; 2];
        let mut rng = rand::thread_rng();
        let n = 50_000;
        for _ in 0..n {
            let p = draw_with_rng(&mut rng, &table).unwrap();
            counts[(p.id - 1) as usize] += 1;
        }
        let observed = counts[0] as f64 / n as f64;
        assert!((observed - 0.5).abs() < 0.02, "observed {observed}");
    }
}
