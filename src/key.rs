use crate::config::{A4_SEMITONES, BASE_FREQ, F_LOW, NOTES_COUNT, SEMITONES_PER_OCTAVE, f_high};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Note {
    C = 0,
    Db = 1,
    D = 2,
    Eb = 3,
    E = 4,
    F = 5,
    Gb = 6,
    G = 7,
    Ab = 8,
    A = 9,
    Bb = 10,
    B = 11,
}

pub const fn note_from_semitone(semitone: i32) -> Note {
    match semitone.rem_euclid(SEMITONES_PER_OCTAVE) {
        0 => Note::C,
        1 => Note::Db,
        2 => Note::D,
        3 => Note::Eb,
        4 => Note::E,
        5 => Note::F,
        6 => Note::Gb,
        7 => Note::G,
        8 => Note::Ab,
        9 => Note::A,
        10 => Note::Bb,
        _ => Note::B,
    }
}

pub const fn note_name(note: Note) -> &'static str {
    match note {
        Note::C => "C",
        Note::Db => "Db",
        Note::D => "D",
        Note::Eb => "Eb",
        Note::E => "E",
        Note::F => "F",
        Note::Gb => "Gb",
        Note::G => "G",
        Note::Ab => "Ab",
        Note::A => "A",
        Note::Bb => "Bb",
        Note::B => "B",
    }
}

/// an equal-tempered key, A4 = 440 Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub note: Note,
    pub octave: i32,
}

impl Key {
    pub const fn from_absolute_semitone(semitone: i32) -> Self {
        Key {
            note: note_from_semitone(semitone),
            octave: semitone.div_euclid(SEMITONES_PER_OCTAVE),
        }
    }

    pub const fn absolute_semitone(self) -> i32 {
        self.octave * SEMITONES_PER_OCTAVE + self.note as i32
    }

    pub fn frequency(self) -> f64 {
        let semitone_diff = self.absolute_semitone() - A4_SEMITONES;
        BASE_FREQ * 2f64.powf(semitone_diff as f64 / 12.0)
    }

    /// closest key to `freq`
    pub fn nearest(freq: f64) -> Self {
        let from_a4 = (12.0 * (freq / BASE_FREQ).log2()).round() as i32;
        Self::from_absolute_semitone(A4_SEMITONES + from_a4)
    }

    /// how far `freq` sits from this key, in cents
    pub fn cents_from(self, freq: f64) -> f64 {
        1200.0 * (freq / self.frequency()).log2()
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", note_name(self.note), self.octave)
    }
}

/// one vertical line of the note grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub key: Key,
    pub frequency: f64,
    /// position along the pitch axis, in [0, 1)
    pub x: f64,
}

/// semitone lines from `F_LOW` up to, but not including, the top of the range
pub fn note_grid() -> Vec<GridLine> {
    let base = Key::nearest(F_LOW).absolute_semitone();
    (0..NOTES_COUNT)
        .map(|i| {
            let frequency = F_LOW * 2f64.powf(i as f64 / 12.0);
            GridLine {
                key: Key::from_absolute_semitone(base + i),
                frequency,
                x: (frequency - F_LOW) / (f_high() - F_LOW),
            }
        })
        .collect()
}
