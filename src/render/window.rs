use anyhow::Result;
use minifb::{Key, Window, WindowOptions};
use opencv::core::{Mat, Vec3b};
use opencv::prelude::*;

/// BGR画素を minifb の 0RGB に詰める
fn pack_bgr(pixel: &Vec3b) -> u32 {
    let b = pixel[0] as u32;
    let g = pixel[1] as u32;
    let r = pixel[2] as u32;
    (r << 16) | (g << 8) | b
}

/// minifbを使用した表示ウィンドウ
pub struct MinifbRenderer {
    window: Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl MinifbRenderer {
    /// ウィンドウを作成
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        Ok(Self {
            window,
            buffer: vec![0u32; width * height],
            width,
            height,
        })
    }

    /// ウィンドウが開いているか
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Esc が押されているか
    pub fn cancel_requested(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// BGR Mat をバッファにコピー
    ///
    /// サイズが異なる場合ははみ出た部分を捨て、足りない部分は黒で埋める。
    pub fn draw_frame(&mut self, frame: &Mat) -> Result<()> {
        let frame_width = frame.cols().max(0) as usize;
        let frame_height = frame.rows().max(0) as usize;

        self.buffer.fill(0);
        for y in 0..self.height.min(frame_height) {
            for x in 0..self.width.min(frame_width) {
                let pixel = frame.at_2d::<Vec3b>(y as i32, x as i32)?;
                self.buffer[y * self.width + x] = pack_bgr(pixel);
            }
        }

        Ok(())
    }

    /// バッファをウィンドウに表示（キー入力もここで更新される）
    pub fn update(&mut self) -> Result<()> {
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_bgr() {
        assert_eq!(pack_bgr(&Vec3b::from([0, 0, 255])), 0xFF0000);
        assert_eq!(pack_bgr(&Vec3b::from([0, 255, 0])), 0x00FF00);
        assert_eq!(pack_bgr(&Vec3b::from([255, 0, 0])), 0x0000FF);
        assert_eq!(pack_bgr(&Vec3b::from([0x12, 0x34, 0x56])), 0x563412);
    }
}
