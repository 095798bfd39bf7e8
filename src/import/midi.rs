//! Standard MIDI File reader
//!
//! Tracks with at least one note become staves. Notes are placed into
//! measures by their onset and given the written value closest to their
//! sounding length; no voice separation or chord detection is attempted.

use std::collections::{BTreeMap, HashMap};

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

use super::{ImportError, Result};
use crate::models::{
    Clef, KeySignature, Measure, MeasureElement, Mode, Note, NoteDuration, Pitch, Score, Staff,
    TimeSignature,
};

const DEFAULT_TEMPO_BPM: f64 = 120.0;

/// Longest staff a MIDI file may expand into
pub const MAX_MEASURES: u64 = 10_000;

/// A note after pairing its on and off events, in absolute ticks
#[derive(Debug, Clone, Copy, PartialEq)]
struct SoundedNote {
    key: u8,
    start: u64,
    length: u64,
}

/// Score-wide settings taken from meta events
#[derive(Debug, Clone, PartialEq)]
struct Conductor {
    tempo: f64,
    time_signature: TimeSignature,
    key_signature: KeySignature,
    title: Option<String>,
}

/// Parse a Standard MIDI File into a score
pub fn parse_midi(bytes: &[u8]) -> Result<Score> {
    let smf = Smf::parse(bytes).map_err(|e| ImportError::Midi(e.to_string()))?;
    let conductor = read_conductor(&smf);

    let ticks_per_quarter = match smf.header.timing {
        Timing::Metrical(tpq) => tpq.as_int().max(1) as f64,
        // Convert SMPTE ticks to the equivalent quarter length at the
        // chosen tempo
        Timing::Timecode(fps, subframes) => {
            let ticks_per_second = fps.as_f32() as f64 * subframes.max(1) as f64;
            ticks_per_second * 60.0 / conductor.tempo
        }
    };

    log::debug!(
        "MIDI: {} tracks, {:.3} ticks/quarter, {} bpm, {}/{}",
        smf.tracks.len(),
        ticks_per_quarter,
        conductor.tempo,
        conductor.time_signature.beats,
        conductor.time_signature.beat_type
    );

    let mut staves = Vec::new();
    for (index, track) in smf.tracks.iter().enumerate() {
        let notes = collect_notes(track);
        if notes.is_empty() {
            continue;
        }
        log::debug!("MIDI track {}: {} notes", index, notes.len());
        staves.push(build_staff(&notes, ticks_per_quarter, &conductor)?);
    }

    if staves.is_empty() {
        log::warn!("MIDI file contains no notes; producing a single empty measure");
        let mut measure = Measure::with_elements(1, vec![whole_rest()]);
        measure.time_signature = Some(conductor.time_signature);
        measure.key_signature = Some(conductor.key_signature);
        measure.clef = Some(Clef::Treble);
        staves.push(Staff::new(Clef::Treble, vec![measure]));
    }

    Ok(Score {
        title: conductor.title,
        composer: None,
        time_signature: conductor.time_signature,
        key_signature: conductor.key_signature,
        tempo: Some(conductor.tempo),
        staves,
    })
}

/// First tempo, meter, key and track name, by absolute tick across all tracks
fn read_conductor(smf: &Smf) -> Conductor {
    let mut tempo: Option<(u64, f64)> = None;
    let mut time_signature: Option<(u64, TimeSignature)> = None;
    let mut key_signature: Option<(u64, KeySignature)> = None;
    let mut title: Option<String> = None;

    fn keep_earliest<T>(slot: &mut Option<(u64, T)>, tick: u64, value: T) {
        if slot.as_ref().map_or(true, |(t, _)| tick < *t) {
            *slot = Some((tick, value));
        }
    }

    for track in &smf.tracks {
        let mut tick: u64 = 0;
        for event in track {
            tick += event.delta.as_int() as u64;
            let TrackEventKind::Meta(meta) = event.kind else {
                continue;
            };
            match meta {
                MetaMessage::Tempo(us_per_quarter) => {
                    let us = us_per_quarter.as_int();
                    if us > 0 {
                        keep_earliest(&mut tempo, tick, 60_000_000.0 / us as f64);
                    }
                }
                MetaMessage::TimeSignature(numerator, denominator_pow, _, _) => {
                    let beat_type = 1u32.checked_shl(denominator_pow as u32).unwrap_or(4);
                    keep_earliest(
                        &mut time_signature,
                        tick,
                        TimeSignature::new(numerator.max(1) as u32, beat_type),
                    );
                }
                MetaMessage::KeySignature(fifths, minor) => {
                    let mode = if minor { Mode::Minor } else { Mode::Major };
                    keep_earliest(
                        &mut key_signature,
                        tick,
                        KeySignature::new(fifths.clamp(-7, 7), mode),
                    );
                }
                MetaMessage::TrackName(name) if title.is_none() => {
                    let name = String::from_utf8_lossy(name).trim().to_string();
                    if !name.is_empty() {
                        title = Some(name);
                    }
                }
                _ => {}
            }
        }
    }

    Conductor {
        tempo: tempo.map(|(_, bpm)| bpm).unwrap_or(DEFAULT_TEMPO_BPM),
        time_signature: time_signature.map(|(_, ts)| ts).unwrap_or_default(),
        key_signature: key_signature.map(|(_, ks)| ks).unwrap_or_default(),
        title,
    }
}

/// Pair note-on and note-off events (note-on with velocity 0 counts as off)
///
/// Overlapping notes on the same key and channel are closed first-in,
/// first-out. Notes still sounding at the end of the track are closed there.
fn collect_notes(track: &[midly::TrackEvent]) -> Vec<SoundedNote> {
    let mut open: HashMap<(u8, u8), Vec<u64>> = HashMap::new();
    let mut notes = Vec::new();
    let mut tick: u64 = 0;

    for event in track {
        tick += event.delta.as_int() as u64;
        let TrackEventKind::Midi { channel, message } = event.kind else {
            continue;
        };
        let channel = channel.as_int();
        match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                open.entry((channel, key.as_int())).or_default().push(tick);
            }
            MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                let key = key.as_int();
                if let Some(starts) = open.get_mut(&(channel, key)) {
                    if !starts.is_empty() {
                        let start = starts.remove(0);
                        notes.push(SoundedNote {
                            key,
                            start,
                            length: tick - start,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    for ((_, key), starts) in open {
        for start in starts {
            log::debug!("MIDI note {} at tick {} never released", key, start);
            notes.push(SoundedNote {
                key,
                start,
                length: tick - start,
            });
        }
    }

    notes.sort_by_key(|n| (n.start, n.key));
    notes
}

fn build_staff(notes: &[SoundedNote], ticks_per_quarter: f64, conductor: &Conductor) -> Result<Staff> {
    let clef = determine_clef(notes);
    // Measure length counts numerator beats as quarter notes
    let measure_ticks = (conductor.time_signature.beats as f64 * ticks_per_quarter).max(1.0);

    let mut by_measure: BTreeMap<u32, Vec<MeasureElement>> = BTreeMap::new();
    for note in notes {
        let index = (note.start as f64 / measure_ticks).floor() as u64;
        if index >= MAX_MEASURES {
            return Err(ImportError::Midi(format!(
                "note at tick {} falls in measure {}, beyond the {} measure limit",
                note.start,
                index.saturating_add(1),
                MAX_MEASURES
            )));
        }
        let number = index as u32 + 1;
        let duration = quantize_duration(note.length as f64 / ticks_per_quarter);
        by_measure
            .entry(number)
            .or_default()
            .push(Note::pitched(Pitch::from_midi(note.key.min(127)), duration).into());
    }

    let last = by_measure.keys().next_back().copied().unwrap_or(1);
    let measures = (1..=last)
        .map(|number| {
            let elements = by_measure
                .remove(&number)
                .unwrap_or_else(|| vec![whole_rest()]);
            let mut measure = Measure::with_elements(number, elements);
            if number == 1 {
                measure.time_signature = Some(conductor.time_signature);
                measure.key_signature = Some(conductor.key_signature);
                measure.clef = Some(clef);
            }
            measure
        })
        .collect();

    Ok(Staff::new(clef, measures))
}

fn whole_rest() -> MeasureElement {
    Note::rest(NoteDuration::Whole).into()
}

/// Written value for a length given in quarter notes
pub fn quantize_duration(quarters: f64) -> NoteDuration {
    if quarters >= 3.5 {
        NoteDuration::Whole
    } else if quarters >= 1.75 {
        NoteDuration::Half
    } else if quarters >= 0.875 {
        NoteDuration::Quarter
    } else if quarters >= 0.4375 {
        NoteDuration::Eighth
    } else if quarters >= 0.21875 {
        NoteDuration::Sixteenth
    } else {
        NoteDuration::ThirtySecond
    }
}

/// Bass clef when the track's mean key is below middle C
fn determine_clef(notes: &[SoundedNote]) -> Clef {
    if notes.is_empty() {
        return Clef::Treble;
    }
    let mean = notes.iter().map(|n| n.key as f64).sum::<f64>() / notes.len() as f64;
    if mean < 60.0 {
        Clef::Bass
    } else {
        Clef::Treble
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u15, u24, u28, u4, u7};
    use midly::{Format, Fps, Header, TrackEvent};

    fn note_on(delta: u32, key: u8) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(90),
                },
            },
        }
    }

    fn note_off(delta: u32, key: u8) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOff {
                    key: u7::new(key),
                    vel: u7::new(0),
                },
            },
        }
    }

    fn meta(delta: u32, message: MetaMessage<'static>) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Meta(message),
        }
    }

    fn write(tracks: Vec<Vec<TrackEvent<'static>>>) -> Vec<u8> {
        write_timed(Timing::Metrical(u15::new(480)), tracks)
    }

    fn write_timed(timing: Timing, tracks: Vec<Vec<TrackEvent<'static>>>) -> Vec<u8> {
        let mut smf = Smf::new(Header::new(Format::Parallel, timing));
        for mut track in tracks {
            track.push(meta(0, MetaMessage::EndOfTrack));
            smf.tracks.push(track);
        }
        let mut out = Vec::new();
        smf.write(&mut out).unwrap();
        out
    }

    #[test]
    fn test_quantize_thresholds() {
        assert_eq!(quantize_duration(4.0), NoteDuration::Whole);
        assert_eq!(quantize_duration(3.5), NoteDuration::Whole);
        assert_eq!(quantize_duration(3.49), NoteDuration::Half);
        assert_eq!(quantize_duration(1.0), NoteDuration::Quarter);
        assert_eq!(quantize_duration(0.5), NoteDuration::Eighth);
        assert_eq!(quantize_duration(0.25), NoteDuration::Sixteenth);
        assert_eq!(quantize_duration(0.1), NoteDuration::ThirtySecond);
        assert_eq!(quantize_duration(0.0), NoteDuration::ThirtySecond);
    }

    #[test]
    fn test_conductor_defaults() {
        let bytes = write(vec![vec![note_on(0, 60), note_off(480, 60)]]);
        let score = parse_midi(&bytes).unwrap();
        assert_eq!(score.tempo, Some(120.0));
        assert_eq!(score.time_signature, TimeSignature::new(4, 4));
        assert_eq!(score.key_signature, KeySignature::new(0, Mode::Major));
        assert_eq!(score.title, None);
    }

    #[test]
    fn test_conductor_meta_events() {
        let conductor = vec![
            meta(0, MetaMessage::TrackName(b"Gavotte")),
            meta(0, MetaMessage::Tempo(u24::new(500_000 * 2))),
            meta(0, MetaMessage::TimeSignature(3, 2, 24, 8)),
            meta(0, MetaMessage::KeySignature(-2, true)),
        ];
        let bytes = write(vec![conductor, vec![note_on(0, 67), note_off(480, 67)]]);
        let score = parse_midi(&bytes).unwrap();
        assert_eq!(score.title.as_deref(), Some("Gavotte"));
        assert_eq!(score.tempo, Some(60.0));
        assert_eq!(score.time_signature, TimeSignature::new(3, 4));
        assert_eq!(score.key_signature, KeySignature::new(-2, Mode::Minor));
        // The conductor track has no notes and yields no staff
        assert_eq!(score.staves.len(), 1);
    }

    #[test]
    fn test_velocity_zero_note_on_closes_note() {
        let track = vec![
            note_on(0, 64),
            TrackEvent {
                delta: u28::new(960),
                kind: TrackEventKind::Midi {
                    channel: u4::new(0),
                    message: MidiMessage::NoteOn {
                        key: u7::new(64),
                        vel: u7::new(0),
                    },
                },
            },
        ];
        let notes = collect_notes(&track);
        assert_eq!(
            notes,
            vec![SoundedNote {
                key: 64,
                start: 0,
                length: 960
            }]
        );
    }

    #[test]
    fn test_unreleased_note_closed_at_track_end() {
        let track = vec![note_on(0, 64), meta(240, MetaMessage::Marker(b"end"))];
        let notes = collect_notes(&track);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].length, 240);
    }

    #[test]
    fn test_bucketing_and_gap_measures() {
        // 4/4 at 480 tpq: measure = 1920 ticks. Notes in measures 1 and 3.
        let track = vec![
            note_on(0, 72),
            note_off(480, 72),
            note_on(0, 74),
            note_off(240, 74),
            note_on(3360, 76),
            note_off(1920, 76),
        ];
        let score = parse_midi(&write(vec![track])).unwrap();
        let staff = &score.staves[0];
        assert_eq!(staff.clef, Clef::Treble);
        assert_eq!(staff.measures.len(), 3);

        let m1 = &staff.measures[0];
        assert_eq!(m1.clef, Some(Clef::Treble));
        assert_eq!(m1.time_signature, Some(TimeSignature::new(4, 4)));
        let durations: Vec<NoteDuration> = m1.elements.iter().map(|e| e.duration()).collect();
        assert_eq!(durations, vec![NoteDuration::Quarter, NoteDuration::Eighth]);

        let m2 = &staff.measures[1];
        assert!(!m2.has_context_change());
        assert_eq!(m2.elements.len(), 1);
        assert!(m2.elements[0].is_rest());
        assert_eq!(m2.elements[0].duration(), NoteDuration::Whole);

        let m3 = &staff.measures[2];
        assert_eq!(m3.number, 3);
        assert_eq!(m3.elements[0].duration(), NoteDuration::Whole);
        assert_eq!(
            m3.elements[0].notes()[0].pitch,
            Some(Pitch::natural(crate::models::Step::E, 5))
        );
    }

    #[test]
    fn test_low_track_gets_bass_clef() {
        let track = vec![note_on(0, 40), note_off(480, 40), note_on(0, 55), note_off(480, 55)];
        let score = parse_midi(&write(vec![track])).unwrap();
        assert_eq!(score.staves[0].clef, Clef::Bass);
    }

    #[test]
    fn test_sharps_only_spelling() {
        let track = vec![note_on(0, 61), note_off(480, 61)];
        let score = parse_midi(&write(vec![track])).unwrap();
        let pitch = score.staves[0].measures[0].elements[0].notes()[0].pitch;
        assert_eq!(pitch.map(|p| p.to_string()), Some("C#4".to_string()));
    }

    #[test]
    fn test_file_without_notes() {
        let bytes = write(vec![vec![meta(0, MetaMessage::Tempo(u24::new(500_000)))]]);
        let score = parse_midi(&bytes).unwrap();
        assert_eq!(score.staves.len(), 1);
        let staff = &score.staves[0];
        assert_eq!(staff.clef, Clef::Treble);
        assert_eq!(staff.measures.len(), 1);
        assert!(staff.measures[0].elements[0].is_rest());
        assert_eq!(staff.measures[0].clef, Some(Clef::Treble));
    }

    #[test]
    fn test_timecode_timing_converted_at_tempo() {
        // 25 fps x 40 subframes = 1000 ticks per second; at 120 bpm a quarter is 500 ticks
        let track = vec![
            note_on(0, 60),
            note_off(500, 60),
            note_on(1500, 62),
            note_off(1000, 62),
        ];
        let score = parse_midi(&write_timed(Timing::Timecode(Fps::Fps25, 40), vec![track])).unwrap();
        let staff = &score.staves[0];
        assert_eq!(staff.measures.len(), 2);
        assert_eq!(staff.measures[0].elements[0].duration(), NoteDuration::Quarter);
        assert_eq!(staff.measures[1].elements[0].duration(), NoteDuration::Half);
    }

    #[test]
    fn test_measure_limit() {
        // 4/4 at 480 tpq: 1920 ticks per measure
        let last_allowed = (MAX_MEASURES as u32 - 1) * 1920;
        let score = parse_midi(&write(vec![vec![note_on(last_allowed, 60), note_off(480, 60)]])).unwrap();
        assert_eq!(score.staves[0].measures.len(), MAX_MEASURES as usize);

        let too_far = MAX_MEASURES as u32 * 1920;
        let result = parse_midi(&write(vec![vec![note_on(too_far, 60), note_off(480, 60)]]));
        assert!(matches!(result, Err(ImportError::Midi(msg)) if msg.contains("measure limit")));
    }

    #[test]
    fn test_huge_gaps_fail_cleanly() {
        // One tick per quarter and many maximal deltas push the onset past u32 measures
        let mut track: Vec<TrackEvent<'static>> = (0..70)
            .map(|_| meta(0x0FFF_FFFF, MetaMessage::Text(b"gap")))
            .collect();
        track.push(note_on(0, 60));
        track.push(note_off(1, 60));
        let bytes = write_timed(Timing::Metrical(u15::new(1)), vec![track]);
        assert!(matches!(parse_midi(&bytes), Err(ImportError::Midi(_))));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(parse_midi(b"not a midi file"), Err(ImportError::Midi(_))));
    }
}
