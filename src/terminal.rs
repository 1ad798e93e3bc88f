// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::screen::Screen;

pub struct Terminal {
    stdout: Stdout,
    run_buf: String,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            run_buf: String::with_capacity(64),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Writes the changed cells of `screen`, merging horizontal runs of one color.
    pub fn draw(&mut self, screen: &mut Screen) -> Result<()> {
        let mut indices: Vec<usize> = if screen.is_dirty_all() {
            self.stdout.queue(terminal::Clear(terminal::ClearType::All))?;
            (0..screen.width as usize * screen.height as usize).collect()
        } else {
            screen.dirty_indices().to_vec()
        };
        if indices.is_empty() {
            screen.clear_dirty();
            return self.stdout.flush();
        }
        indices.sort_unstable();

        let width = screen.width as usize;
        let mut cur_fg: Option<Option<Color>> = None;
        let mut i = 0usize;
        while i < indices.len() {
            let start = indices[i];
            let first = screen.cell_at_index(start);
            self.run_buf.clear();
            self.run_buf.push(first.ch);

            let mut j = i + 1;
            while j < indices.len()
                && indices[j] == indices[j - 1] + 1
                && indices[j] % width != 0
                && screen.cell_at_index(indices[j]).fg == first.fg
            {
                self.run_buf.push(screen.cell_at_index(indices[j]).ch);
                j += 1;
            }

            let (x, y) = ((start % width) as u16, (start / width) as u16);
            self.stdout.queue(cursor::MoveTo(x, y))?;
            if cur_fg != Some(first.fg) {
                self.stdout
                    .queue(SetForegroundColor(first.fg.unwrap_or(Color::Reset)))?;
                cur_fg = Some(first.fg);
            }
            self.stdout.queue(Print(self.run_buf.as_str()))?;
            i = j;
        }

        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        screen.clear_dirty();
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
