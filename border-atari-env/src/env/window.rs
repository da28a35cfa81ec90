use anyhow::{anyhow, Result};
use image::RgbImage;
use pixels::{Pixels, SurfaceTexture};
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    platform::run_return::EventLoopExtRunReturn,
    window::{Window, WindowBuilder},
};

const SCALE: u32 = 3;

/// Window showing the screen of the emulator.
pub(super) struct AtariWindow {
    event_loop: EventLoop<()>,
    window: Window,
    pixels: Pixels<Window>,
    close_requested: bool,
}

impl AtariWindow {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        let event_loop = EventLoop::new();
        let window = WindowBuilder::new()
            .with_title(title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                (width * SCALE) as f64,
                (height * SCALE) as f64,
            ))
            .build(&event_loop)?;
        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let pixels = Pixels::new(width, height, surface_texture)
            .map_err(|e| anyhow!("Failed to create a pixel buffer: {:?}", e))?;

        Ok(Self {
            event_loop,
            window,
            pixels,
            close_requested: false,
        })
    }

    /// Returns `true` once the user asked to close the window.
    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    /// Draws an RGB screen.
    pub fn draw(&mut self, screen: &RgbImage) -> Result<()> {
        let mut close_requested = false;
        self.event_loop.run_return(|event, _, control_flow| {
            if let Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } = event
            {
                close_requested = true;
            }
            *control_flow = ControlFlow::Exit;
        });
        self.close_requested |= close_requested;

        for (dst, src) in self
            .pixels
            .get_frame()
            .chunks_exact_mut(4)
            .zip(screen.pixels())
        {
            dst[..3].copy_from_slice(&src.0);
            dst[3] = 0xff;
        }
        self.pixels
            .render()
            .map_err(|e| anyhow!("Failed to render: {:?}", e))?;
        self.window.request_redraw();
        Ok(())
    }
}
