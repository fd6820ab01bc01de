use fcm_core::config::FcmConfig;
use fcm_core::notify::message::{FcmMessage, FcmNotification};
use fcm_core::notify::testing::{FixedResolver, RecordingFailureSink};
use fcm_notify::fcm::FcmChannel;
use std::env;
use std::sync::Arc;

/// # Summary
/// 集成测试：验证真实 FCM 推送 (dry_run，不会真正下发到设备)。
///
/// # Logic
/// 1. 加载 .env 环境变量。
/// 2. 从环境变量获取 Server Key 和设备 token。
/// 3. 初始化 FcmChannel。
/// 4. 发送 dry_run 消息并断言返回了一个批次结果。
#[tokio::test]
#[ignore] // 默认忽略，仅在手动测试时通过环境变量开启
async fn test_fcm_dry_run_notification() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let api_key = env::var("FCM_TEST_API_KEY")?;
    let token = env::var("FCM_TEST_DEVICE_TOKEN")?;

    let config = FcmConfig {
        api_key,
        ..FcmConfig::default()
    };
    let sink = Arc::new(RecordingFailureSink::<String>::new());
    let channel = FcmChannel::<String>::from_config(
        config,
        Arc::new(FixedResolver::none()),
        sink.clone(),
    )?;

    let message = FcmMessage::new()
        .to(token)
        .notification(FcmNotification::new("FCM 测试", "这是一条来自集成测试的消息"))
        .dry_run(true);
    let report = channel.send(&"tester".to_string(), &message).await?;

    assert_eq!(report.len(), 1, "unexpected report: {:?}", report);
    assert!(sink.events().is_empty(), "FCM reported failure: {:?}", sink.events());
    Ok(())
}
