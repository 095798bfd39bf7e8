//! MusicXML reader
//!
//! Walks a `<score-partwise>` document with roxmltree and produces one staff
//! per `<part>`. Only the constructs the notation model represents are read;
//! everything else in the document is ignored.

use roxmltree::{Document as XmlDocument, Node};

use super::{ImportError, Result};
use crate::models::{
    Accidental, Beam, Chord, Clef, KeySignature, Measure, MeasureElement, Mode, Note,
    NoteDuration, Pitch, Score, Staff, Step, TimeSignature,
};

/// Parse a MusicXML document into a score
pub fn parse_musicxml(xml: &str) -> Result<Score> {
    let doc = XmlDocument::parse(xml).map_err(|e| ImportError::Xml(e.to_string()))?;
    let root = doc.root_element();

    match root.tag_name().name() {
        "score-partwise" => parse_score_partwise(root),
        "score-timewise" => Err(ImportError::UnsupportedMusicXml(
            "score-timewise format (use score-partwise instead)".to_string(),
        )),
        other => Err(ImportError::InvalidMusicXml(format!(
            "expected <score-partwise> root, found <{}>",
            other
        ))),
    }
}

fn parse_score_partwise(root: Node) -> Result<Score> {
    let title = path_text(root, &["work", "work-title"])
        .or_else(|| child_text(root, "movement-title"))
        .map(str::to_string);
    let composer = child(root, "identification")
        .and_then(|ident| {
            ident
                .children()
                .find(|n| n.has_tag_name("creator") && n.attribute("type") == Some("composer"))
        })
        .and_then(|n| n.text())
        .map(|s| s.trim().to_string());

    let mut time_signature = TimeSignature::default();
    let mut key_signature = KeySignature::default();
    // Carried across parts: a part without its own clef inherits the first
    // clef announced by an earlier part.
    let mut default_clef = Clef::Treble;
    let mut staves = Vec::new();

    for part in root.children().filter(|n| n.has_tag_name("part")) {
        let mut current_clef = default_clef;
        let mut measures = Vec::new();

        for (idx, measure_node) in part
            .children()
            .filter(|n| n.has_tag_name("measure"))
            .enumerate()
        {
            let number = measure_node
                .attribute("number")
                .and_then(|s| s.trim().parse::<u32>().ok())
                .unwrap_or(idx as u32 + 1);
            let measure = parse_measure(measure_node, number)?;

            if let Some(clef) = measure.clef {
                current_clef = clef;
            }
            if idx == 0 {
                if let Some(ts) = measure.time_signature {
                    time_signature = ts;
                }
                if let Some(ks) = measure.key_signature {
                    key_signature = ks;
                }
                if let Some(clef) = measure.clef {
                    default_clef = clef;
                }
            }
            measures.push(measure);
        }

        log::debug!(
            "MusicXML part '{}': {} measures",
            part.attribute("id").unwrap_or("?"),
            measures.len()
        );
        staves.push(Staff::new(current_clef, measures));
    }

    if staves.is_empty() {
        log::warn!("MusicXML document has no <part> elements");
    }

    Ok(Score {
        title,
        composer,
        time_signature,
        key_signature,
        tempo: parse_tempo(root),
        staves,
    })
}

/// First `<sound tempo="...">` anywhere in the document
fn parse_tempo(root: Node) -> Option<f64> {
    root.descendants()
        .filter(|n| n.has_tag_name("sound"))
        .find_map(|n| n.attribute("tempo").and_then(|t| t.trim().parse::<f64>().ok()))
        .filter(|bpm| *bpm > 0.0)
}

fn parse_measure(measure_node: Node, number: u32) -> Result<Measure> {
    let mut measure = Measure::new(number);

    // Context markers: first announcement of each field in the measure wins
    for attributes in measure_node.children().filter(|n| n.has_tag_name("attributes")) {
        if measure.clef.is_none() {
            measure.clef = child(attributes, "clef").map(parse_clef);
        }
        if measure.time_signature.is_none() {
            measure.time_signature = child(attributes, "time").map(parse_time_signature);
        }
        if measure.key_signature.is_none() {
            measure.key_signature = child(attributes, "key").map(parse_key_signature);
        }
    }

    let mut pending: Vec<Note> = Vec::new();
    for note_node in measure_node.children().filter(|n| n.has_tag_name("note")) {
        let note = parse_note(note_node);
        let is_chord_member = child(note_node, "chord").is_some();

        if is_chord_member && !pending.is_empty() {
            pending.push(note);
        } else {
            flush_pending(&mut pending, &mut measure.elements)?;
            pending.push(note);
        }
    }
    flush_pending(&mut pending, &mut measure.elements)?;

    Ok(measure)
}

/// Emit the accumulated note group as a lone note or a chord
fn flush_pending(pending: &mut Vec<Note>, elements: &mut Vec<MeasureElement>) -> Result<()> {
    match pending.len() {
        0 => {}
        1 => elements.extend(pending.drain(..).map(MeasureElement::Note)),
        _ => {
            let mut notes: Vec<Note> = pending.drain(..).collect();
            let (duration, dots) = (notes[0].duration, notes[0].dots);
            for note in notes.iter_mut().skip(1) {
                if note.duration != duration || note.dots != dots {
                    log::debug!(
                        "Chord member {} normalised to {}",
                        note.duration.token(),
                        duration.token()
                    );
                    note.duration = duration;
                    note.dots = dots;
                }
            }
            elements.push(MeasureElement::Chord(Chord::new(notes)?));
        }
    }
    Ok(())
}

fn parse_note(note_node: Node) -> Note {
    let duration = match child_text(note_node, "type") {
        Some(token) => NoteDuration::from_token(token).unwrap_or_else(|| {
            log::debug!("Unknown note type '{}', using quarter", token);
            NoteDuration::Quarter
        }),
        None => NoteDuration::Quarter,
    };
    let dots = note_node.children().filter(|n| n.has_tag_name("dot")).count() as u8;
    let voice = child_text(note_node, "voice")
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(1);

    let pitch = if child(note_node, "rest").is_some() {
        None
    } else {
        let pitch = child(note_node, "pitch").map(|p| parse_pitch(note_node, p));
        if pitch.is_none() {
            log::debug!("Note without <pitch> treated as a rest");
        }
        pitch
    };

    let tied = Some(child(note_node, "tie").is_some());
    let slurred = Some(
        child(note_node, "notations")
            .and_then(|n| child(n, "slur"))
            .is_some(),
    );
    let beam = child_text(note_node, "beam").and_then(Beam::from_token);

    Note {
        is_rest: pitch.is_none(),
        pitch,
        duration,
        dots,
        tied,
        slurred,
        voice,
        beam,
    }
}

fn parse_pitch(note_node: Node, pitch_node: Node) -> Pitch {
    let step = match child_text(pitch_node, "step") {
        Some(letter) => Step::from_letter(letter).unwrap_or_else(|| {
            log::debug!("Unknown step '{}', using C", letter);
            Step::C
        }),
        None => Step::C,
    };
    let octave = child_text(pitch_node, "octave")
        .and_then(|o| o.trim().parse::<i8>().ok())
        .unwrap_or(4);

    // The written accidental wins; otherwise derive one from the alteration
    let accidental = child_text(note_node, "accidental")
        .and_then(Accidental::from_name)
        .or_else(|| {
            child_text(pitch_node, "alter")
                .and_then(|a| a.trim().parse::<f64>().ok())
                .and_then(|a| Accidental::from_alter(a.round() as i32))
        });

    Pitch::new(step, octave, accidental)
}

fn parse_clef(clef_node: Node) -> Clef {
    let sign = child_text(clef_node, "sign").unwrap_or_default();
    let line = child_text(clef_node, "line").unwrap_or_default();
    Clef::from_sign_line(sign, line).unwrap_or_else(|| {
        log::debug!("Unknown clef sign='{}' line='{}', using treble", sign, line);
        Clef::Treble
    })
}

fn parse_time_signature(time_node: Node) -> TimeSignature {
    let beats = child_text(time_node, "beats")
        .and_then(|b| b.trim().parse::<u32>().ok())
        .unwrap_or(4);
    let beat_type = child_text(time_node, "beat-type")
        .and_then(|b| b.trim().parse::<u32>().ok())
        .unwrap_or(4);
    TimeSignature::new(beats, beat_type)
}

fn parse_key_signature(key_node: Node) -> KeySignature {
    let fifths = child_text(key_node, "fifths")
        .and_then(|f| f.trim().parse::<i8>().ok())
        .unwrap_or(0);
    let mode = match child_text(key_node, "mode").map(str::trim) {
        Some("minor") => Mode::Minor,
        _ => Mode::Major,
    };
    KeySignature::new(fifths, mode)
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name).and_then(|n| n.text())
}

fn path_text<'a>(node: Node<'a, '_>, path: &[&str]) -> Option<&'a str> {
    let mut current = node;
    for name in path {
        current = child(current, name)?;
    }
    current.text()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_measure(body: &str) -> String {
        format!(
            r#"<?xml version="1.0"?>
<score-partwise version="3.1">
  <part-list><score-part id="P1"><part-name>Music</part-name></score-part></part-list>
  <part id="P1">
    <measure number="1">{}</measure>
  </part>
</score-partwise>"#,
            body
        )
    }

    fn first_measure(score: &Score) -> &Measure {
        &score.staves[0].measures[0]
    }

    #[test]
    fn test_parse_accidental_from_alter() {
        let score = parse_musicxml(&wrap_measure(
            r#"<note><pitch><step>B</step><alter>-1</alter><octave>3</octave></pitch><type>half</type></note>"#,
        ))
        .unwrap();
        let note = &first_measure(&score).elements[0].notes()[0];
        assert_eq!(note.pitch, Some(Pitch::new(Step::B, 3, Some(Accidental::Flat))));
        assert_eq!(note.duration, NoteDuration::Half);
    }

    #[test]
    fn test_written_accidental_wins_over_alter() {
        let score = parse_musicxml(&wrap_measure(
            r#"<note><pitch><step>F</step><alter>1</alter><octave>4</octave></pitch><type>quarter</type><accidental>natural</accidental></note>"#,
        ))
        .unwrap();
        let note = &first_measure(&score).elements[0].notes()[0];
        assert_eq!(note.accidental(), Some(Accidental::Natural));
    }

    #[test]
    fn test_unknown_tokens_fall_back() {
        let score = parse_musicxml(&wrap_measure(
            r#"<attributes><clef><sign>percussion</sign></clef></attributes>
               <note><pitch><step>E</step><octave>4</octave></pitch><type>breve</type><accidental>quarter-sharp</accidental></note>"#,
        ))
        .unwrap();
        let measure = first_measure(&score);
        assert_eq!(measure.clef, Some(Clef::Treble));
        let note = &measure.elements[0].notes()[0];
        assert_eq!(note.duration, NoteDuration::Quarter);
        assert_eq!(note.accidental(), None);
    }

    #[test]
    fn test_rest_dots_voice_and_flags() {
        let score = parse_musicxml(&wrap_measure(
            r#"<note><rest/><type>half</type><dot/><voice>2</voice></note>
               <note><pitch><step>G</step><octave>4</octave></pitch><type>eighth</type>
                 <tie type="start"/><beam number="1">begin</beam><notations><slur type="start"/></notations></note>"#,
        ))
        .unwrap();
        let measure = first_measure(&score);
        let rest = &measure.elements[0].notes()[0];
        assert!(rest.is_rest);
        assert_eq!(rest.pitch, None);
        assert_eq!(rest.dots, 1);
        assert_eq!(rest.voice, 2);

        let note = &measure.elements[1].notes()[0];
        assert_eq!(note.tied, Some(true));
        assert_eq!(note.slurred, Some(true));
        assert_eq!(note.beam, Some(Beam::Begin));
    }

    #[test]
    fn test_chord_grouping() {
        let score = parse_musicxml(&wrap_measure(
            r#"<note><pitch><step>C</step><octave>4</octave></pitch><type>half</type></note>
               <note><chord/><pitch><step>E</step><octave>4</octave></pitch><type>half</type></note>
               <note><chord/><pitch><step>G</step><octave>4</octave></pitch><type>quarter</type></note>
               <note><pitch><step>A</step><octave>4</octave></pitch><type>quarter</type></note>"#,
        ))
        .unwrap();
        let elements = &first_measure(&score).elements;
        assert_eq!(elements.len(), 2);
        match &elements[0] {
            MeasureElement::Chord(chord) => {
                assert_eq!(chord.notes.len(), 3);
                assert_eq!(chord.duration, NoteDuration::Half);
                assert!(chord.notes.iter().all(|n| n.duration == NoteDuration::Half));
                let steps: Vec<Step> = chord.notes.iter().map(|n| n.pitch.unwrap().step).collect();
                assert_eq!(steps, vec![Step::C, Step::E, Step::G]);
            }
            other => panic!("expected chord, got {:?}", other),
        }
        assert!(matches!(elements[1], MeasureElement::Note(_)));
    }

    #[test]
    fn test_header_fields_and_tempo() {
        let xml = r#"<score-partwise>
  <work><work-title>Minuet</work-title></work>
  <identification><creator type="lyricist">X</creator><creator type="composer">Petzold</creator></identification>
  <part-list><score-part id="P1"/></part-list>
  <part id="P1">
    <measure number="1">
      <direction><sound tempo="96"/></direction>
      <attributes><key><fifths>1</fifths><mode>minor</mode></key><time><beats>3</beats><beat-type>4</beat-type></time><clef><sign>F</sign><line>4</line></clef></attributes>
    </measure>
  </part>
</score-partwise>"#;
        let score = parse_musicxml(xml).unwrap();
        assert_eq!(score.title.as_deref(), Some("Minuet"));
        assert_eq!(score.composer.as_deref(), Some("Petzold"));
        assert_eq!(score.tempo, Some(96.0));
        assert_eq!(score.time_signature, TimeSignature::new(3, 4));
        assert_eq!(score.key_signature, KeySignature::new(1, Mode::Minor));
        assert_eq!(score.staves[0].clef, Clef::Bass);
    }

    #[test]
    fn test_movement_title_fallback_and_measure_numbers() {
        let xml = r#"<score-partwise>
  <movement-title>Allegro</movement-title>
  <part id="P1">
    <measure number="1"/>
    <measure number="X2"/>
  </part>
</score-partwise>"#;
        let score = parse_musicxml(xml).unwrap();
        assert_eq!(score.title.as_deref(), Some("Allegro"));
        let numbers: Vec<u32> = score.staves[0].measures.iter().map(|m| m.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_staff_clef_tracks_last_change() {
        let xml = r#"<score-partwise>
  <part id="P1">
    <measure number="1"><attributes><clef><sign>G</sign><line>2</line></clef></attributes></measure>
    <measure number="2"><attributes><clef><sign>C</sign><line>3</line></clef></attributes></measure>
  </part>
</score-partwise>"#;
        let score = parse_musicxml(xml).unwrap();
        assert_eq!(score.staves[0].clef, Clef::Alto);
        assert_eq!(score.staves[0].measures[1].clef, Some(Clef::Alto));
    }

    #[test]
    fn test_rejects_bad_documents() {
        assert!(matches!(parse_musicxml("<score-partwise>"), Err(ImportError::Xml(_))));
        assert!(matches!(
            parse_musicxml("<score-timewise/>"),
            Err(ImportError::UnsupportedMusicXml(_))
        ));
        assert!(matches!(
            parse_musicxml("<html/>"),
            Err(ImportError::InvalidMusicXml(_))
        ));
    }
}
