use phys2d::{
    core::{Color, DebugDraw, DrawFlags},
    math::{Transform, Vector2},
    Material, PhysicsWorld, Shape,
};
use std::io::{stdout, Write};
use std::thread::sleep;
use std::time::{Duration, Instant};
use crossterm::{
    ExecutableCommand, QueueableCommand,
    terminal::{Clear, ClearType},
    cursor::{Hide, Show, MoveTo},
    style::{self, Print, SetForegroundColor, ResetColor},
};

const FRAME_DURATION: Duration = Duration::from_millis(33); // ~30 FPS
const SIMULATION_DURATION: f32 = 15.0; // seconds
const TIME_STEP: f32 = 1.0 / 60.0;
const CHAIN_LINKS: usize = 6;

fn get_terminal_size() -> (usize, usize) {
    let default_size = (80, 24);

    match term_size::dimensions() {
        Some((w, h)) => (w, h),
        None => default_size,
    }
}

/// Rasterizes debug primitives into a character grid.
///
/// World units map to one column each; rows are twice as tall as columns,
/// so y is halved.
struct ConsoleCanvas {
    width: usize,
    height: usize,
    cells: Vec<Option<(char, style::Color)>>,
    flags: DrawFlags,
}

impl ConsoleCanvas {
    fn new(width: usize, height: usize, flags: DrawFlags) -> Self {
        Self { width, height, cells: vec![None; width * height], flags }
    }

    fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
    }

    fn to_screen(&self, point: Vector2) -> (i32, i32) {
        let column = point.x.round() as i32;
        let row = self.height as i32 - 1 - (point.y * 0.5).round() as i32;
        (column, row)
    }

    fn plot(&mut self, column: i32, row: i32, glyph: char, color: Color) {
        if column < 0 || row < 0 || column as usize >= self.width || row as usize >= self.height {
            return;
        }
        self.cells[row as usize * self.width + column as usize] = Some((glyph, terminal_color(color)));
    }

    fn line(&mut self, p1: Vector2, p2: Vector2, glyph: char, color: Color) {
        let (mut x0, mut y0) = self.to_screen(p1);
        let (x1, y1) = self.to_screen(p2);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x0, y0, glyph, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn present(&self, out: &mut impl Write) -> std::io::Result<()> {
        for row in 0..self.height {
            out.queue(MoveTo(0, row as u16))?;
            for column in 0..self.width {
                match self.cells[row * self.width + column] {
                    Some((glyph, color)) => {
                        out.queue(SetForegroundColor(color))?.queue(Print(glyph))?;
                    }
                    None => {
                        out.queue(Print(' '))?;
                    }
                }
            }
        }
        out.queue(ResetColor)?;
        out.flush()
    }
}

fn terminal_color(color: Color) -> style::Color {
    style::Color::Rgb {
        r: (color.r.clamp(0.0, 1.0) * 255.0) as u8,
        g: (color.g.clamp(0.0, 1.0) * 255.0) as u8,
        b: (color.b.clamp(0.0, 1.0) * 255.0) as u8,
    }
}

impl DebugDraw for ConsoleCanvas {
    fn flags(&self) -> DrawFlags {
        self.flags
    }

    fn draw_polygon(&mut self, vertices: &[Vector2], color: Color) {
        for (i, vertex) in vertices.iter().enumerate() {
            let next = vertices[(i + 1) % vertices.len()];
            self.line(*vertex, next, '·', color);
        }
    }

    fn draw_solid_polygon(&mut self, vertices: &[Vector2], color: Color) {
        for (i, vertex) in vertices.iter().enumerate() {
            let next = vertices[(i + 1) % vertices.len()];
            self.line(*vertex, next, '#', color);
        }
    }

    fn draw_circle(&mut self, center: Vector2, radius: f32, color: Color) {
        let segments = 16;
        for i in 0..segments {
            let a0 = i as f32 / segments as f32 * std::f32::consts::TAU;
            let a1 = (i + 1) as f32 / segments as f32 * std::f32::consts::TAU;
            let p0 = center + Vector2::new(a0.cos(), a0.sin()) * radius;
            let p1 = center + Vector2::new(a1.cos(), a1.sin()) * radius;
            self.line(p0, p1, 'o', color);
        }
    }

    fn draw_solid_circle(&mut self, center: Vector2, radius: f32, axis: Vector2, color: Color) {
        self.draw_circle(center, radius, color);
        self.line(center, center + axis * radius, '*', color);
    }

    fn draw_segment(&mut self, p1: Vector2, p2: Vector2, color: Color) {
        self.line(p1, p2, '+', color);
    }

    fn draw_transform(&mut self, transform: &Transform) {
        let origin = transform.position;
        self.line(origin, origin + transform.rotation.x_axis(), '-', Color::new(1.0, 0.0, 0.0));
        self.line(origin, origin + transform.rotation.y_axis(), '|', Color::new(0.0, 1.0, 0.0));
    }
}

fn build_scene(world: &mut PhysicsWorld, width: f32, height: f32) {
    let ground = world.create_body(&Shape::rectangle(width, 2.0), Vector2::new(width / 2.0, 1.0), 0.0);
    if let Ok(body) = world.get_body_mut(ground) {
        body.set_material(Material::wood());
    }

    for i in 0..5 {
        let x = width * 0.2 + i as f32 * 2.5;
        let y = height * 0.8 + i as f32 * 3.0;
        let handle = world.create_body(&Shape::rectangle(2.0, 2.0), Vector2::new(x, y), 1.0);
        if let Ok(body) = world.get_body_mut(handle) {
            body.set_angular_velocity(0.5 - i as f32 * 0.25);
        }
        world.create_body(&Shape::circle(1.5), Vector2::new(x + 8.0, y + 6.0), 2.0);
    }

    // A chain hanging from a static pin
    let pin = Vector2::new(width * 0.75, height * 1.8);
    let mut previous = world.create_body(&Shape::circle(0.5), pin, 0.0);
    for link in 1..=CHAIN_LINKS {
        let position = pin + Vector2::new(link as f32 * 2.0, 0.0);
        let current = world.create_body(&Shape::circle(0.5), position, 1.0);
        let anchor = world.get_body(previous).map(|body| body.get_position()).unwrap_or(position);
        if world.create_joint(previous, current, anchor).is_err() {
            break;
        }
        previous = current;
    }
}

fn main() -> Result<(), std::io::Error> {
    let (columns, rows) = get_terminal_size();
    let rows = rows.saturating_sub(2).max(10);

    let mut world = PhysicsWorld::new();
    build_scene(&mut world, columns as f32, rows as f32);

    let mut canvas = ConsoleCanvas::new(columns, rows, DrawFlags::SHAPE | DrawFlags::JOINT);

    let mut stdout = stdout();
    stdout.execute(Hide)?;
    stdout.execute(Clear(ClearType::All))?;

    let start_time = Instant::now();
    let mut frame_time = Instant::now();

    while start_time.elapsed().as_secs_f32() < SIMULATION_DURATION {
        // Two fixed physics steps per rendered frame
        world.step(TIME_STEP);
        world.step(TIME_STEP);

        canvas.clear();
        world.debug_draw(&mut canvas);
        canvas.present(&mut stdout)?;

        stdout
            .queue(MoveTo(0, rows as u16))?
            .queue(Print(format!(
                "t={:.2}s bodies={} contacts={} joints={}",
                world.get_time(),
                world.body_count(),
                world.contacts().len(),
                world.constraint_count()
            )))?;
        stdout.flush()?;

        let elapsed = frame_time.elapsed();
        if elapsed < FRAME_DURATION {
            sleep(FRAME_DURATION - elapsed);
        }
        frame_time = Instant::now();
    }

    stdout.execute(Show)?;
    stdout.execute(MoveTo(0, rows as u16 + 1))?;

    Ok(())
}
