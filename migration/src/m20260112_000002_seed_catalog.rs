use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 初始盲盒目录。
///
/// 权重为抽奖时按总和归一化的相对权重, 总和不要求等于 1.0
/// (低于 1.0 的部分等价于保留的 "Better Luck Next Time" RTP 空间)。
/// demo 模式的奖品表刻意调高期望回报用于体验展示;
/// is_drawable = FALSE 的条目仅用于橱窗展示, 永远不会被抽中。
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        let insert_boxes = r#"
INSERT INTO boxes (name, price_cents, is_active)
VALUES
 ('Starter Case', 200, TRUE),   -- $2.00
 ('Premium Case', 1000, TRUE)   -- $10.00
ON CONFLICT (name) DO NOTHING;
"#;
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            insert_boxes.to_string(),
        ))
        .await?;

        let insert_prizes = r#"
INSERT INTO prizes (box_id, mode, name, value_cents, weight, is_drawable, is_active)
SELECT b.id, v.mode::account_mode, v.name, v.value_cents, v.weight, v.is_drawable, TRUE
FROM (VALUES
 -- Starter Case / real (RTP ~ 85%)
 ('Starter Case', 'real', 'Sticker Pack',            50, 0.50, TRUE,  TRUE),
 ('Starter Case', 'real', 'Keychain',               150, 0.30, TRUE,  TRUE),
 ('Starter Case', 'real', 'Enamel Pin Set',         400, 0.13, TRUE,  TRUE),
 ('Starter Case', 'real', 'Collector Figurine',    2000, 0.04, TRUE,  TRUE),
 ('Starter Case', 'real', 'Better Luck Next Time',    0, 0.03, TRUE,  TRUE),
 ('Starter Case', 'real', 'Signed Poster',         15000, 0.00, FALSE, TRUE),
 -- Starter Case / demo (体验模式回报调高)
 ('Starter Case', 'demo', 'Sticker Pack',            50, 0.30, TRUE,  TRUE),
 ('Starter Case', 'demo', 'Keychain',               150, 0.35, TRUE,  TRUE),
 ('Starter Case', 'demo', 'Enamel Pin Set',         400, 0.25, TRUE,  TRUE),
 ('Starter Case', 'demo', 'Collector Figurine',    2000, 0.10, TRUE,  TRUE),
 -- Premium Case / real
 ('Premium Case', 'real', 'Mystery Tee',            600, 0.45, TRUE,  TRUE),
 ('Premium Case', 'real', 'Hoodie',                2500, 0.28, TRUE,  TRUE),
 ('Premium Case', 'real', 'Mechanical Keyboard',   9000, 0.15, TRUE,  TRUE),
 ('Premium Case', 'real', 'Console Bundle',       45000, 0.02, TRUE,  TRUE),
 ('Premium Case', 'real', 'Better Luck Next Time',    0, 0.10, TRUE,  TRUE),
 ('Premium Case', 'real', 'Gold Trophy',         250000, 0.00, FALSE, TRUE),
 -- Premium Case / demo
 ('Premium Case', 'demo', 'Mystery Tee',            600, 0.30, TRUE,  TRUE),
 ('Premium Case', 'demo', 'Hoodie',                2500, 0.40, TRUE,  TRUE),
 ('Premium Case', 'demo', 'Mechanical Keyboard',   9000, 0.22, TRUE,  TRUE),
 ('Premium Case', 'demo', 'Console Bundle',       45000, 0.08, TRUE,  TRUE)
) AS v(box_name, mode, name, value_cents, weight, is_drawable, is_active)
JOIN boxes b ON b.name = v.box_name
WHERE NOT EXISTS (
    SELECT 1 FROM prizes p
    WHERE p.box_id = b.id AND p.mode = v.mode::account_mode AND p.name = v.name
);
"#;
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            insert_prizes.to_string(),
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            r#"DELETE FROM prizes WHERE box_id IN
               (SELECT id FROM boxes WHERE name IN ('Starter Case', 'Premium Case'))"#
                .to_string(),
        ))
        .await?;
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            "DELETE FROM boxes WHERE name IN ('Starter Case', 'Premium Case')".to_string(),
        ))
        .await?;
        Ok(())
    }
}
