use clap::Parser;
use std::path::PathBuf;

use crate::render::KeypointSelection;

/// MoveNet(singlepose) のキーポイントをカメラ映像に重ねて表示する
///
/// 指定しなかったオプションは設定ファイル（無ければ既定値）に従う。
#[derive(Parser, Debug)]
#[command(name = "movenet-viewer", version = env!("GIT_VERSION"), about, long_about = None)]
pub struct Cli {
    /// カメラデバイス番号 [既定: 0]
    #[arg(long)]
    pub device: Option<i32>,

    /// 動画ファイル（--device より優先）
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// キャプチャ幅 [既定: 960]
    #[arg(long)]
    pub width: Option<u32>,

    /// キャプチャ高さ [既定: 540]
    #[arg(long)]
    pub height: Option<u32>,

    /// 左右反転して処理する
    #[arg(long)]
    pub mirror: bool,

    /// モデル: 0=lightning fp16, 1=thunder fp16, 2=lightning int8, 3=thunder int8 [既定: 0]
    #[arg(long, alias = "model_select", allow_negative_numbers = true)]
    pub model_select: Option<i64>,

    /// キーポイント信頼度の閾値 [既定: 0.4]
    #[arg(long, alias = "keypoint_score")]
    pub keypoint_score: Option<f32>,

    /// 閾値以下のキーポイントを描画しない
    #[arg(long)]
    pub apply_score_threshold: bool,

    /// 描画するキーポイント [既定: wrists]
    #[arg(long, value_enum)]
    pub draw: Option<KeypointSelection>,

    /// 設定ファイル
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_args() {
        let args = Cli::parse_from(["app"]);
        assert!(args.device.is_none());
        assert!(args.file.is_none());
        assert!(!args.mirror);
        assert!(args.model_select.is_none());
        assert!(args.draw.is_none());
        assert_eq!(args.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn test_underscore_aliases() {
        let args = Cli::parse_from(["app", "--model_select", "3", "--keypoint_score", "0.25"]);
        assert_eq!(args.model_select, Some(3));
        assert_eq!(args.keypoint_score, Some(0.25));
    }

    #[test]
    fn test_out_of_range_selector_parses() {
        // 範囲チェックは ModelPreset::from_selector で行う
        let args = Cli::parse_from(["app", "--model-select", "4"]);
        assert_eq!(args.model_select, Some(4));
        let args = Cli::parse_from(["app", "--model-select", "-1"]);
        assert_eq!(args.model_select, Some(-1));
    }

    #[test]
    fn test_draw_full() {
        let args = Cli::parse_from(["app", "--draw", "full", "--device", "1"]);
        assert_eq!(args.draw, Some(KeypointSelection::Full));
        assert_eq!(args.device, Some(1));
    }
}
