use std::path::Path;

use kana_core::settings;
use kana_engine::DataFile;
use kana_session::{ConversionRequest, Converter, Request, Segment, Segments};

use super::{column_width, pad};

fn print_segments(segments: &Segments, n: usize) {
    let conversion = segments.conversion_segments();
    let width = column_width(conversion.iter().map(Segment::key));
    for seg in conversion {
        let values: Vec<&str> = seg
            .candidates()
            .iter()
            .take(n)
            .map(|c| c.value.as_str())
            .collect();
        println!("{}  {}", pad(seg.key(), width), values.join(" / "));
    }
}

/// Convert `kana` and print each segment's top candidates. With `predict`,
/// print ranked completions instead.
pub fn convert_cmd(file: &str, kana: &str, n: usize, kana_insensitive: bool, predict: bool) {
    let data = die!(DataFile::open(Path::new(file)), "Error opening {file}: {}");
    let dict = die!(data.dictionary(), "Error opening dictionary: {}");
    let converter = Converter::new(&dict);

    let config = &settings::settings().conversion;
    let client = Request {
        kana_modifier_insensitive_conversion: kana_insensitive,
        ..Request::default()
    };
    let request = ConversionRequest::new(None, &client, config);

    let mut segments = Segments::with_settings(&settings::settings().segments);
    if predict {
        die!(
            converter.start_prediction(&request, &mut segments, kana),
            "Error: {}"
        );
    } else {
        die!(
            converter.start_conversion(&request, &mut segments, kana),
            "Error: {}"
        );
    }

    let best: String = segments
        .conversion_segments()
        .iter()
        .filter_map(|s| s.candidate(0))
        .map(|c| c.value.as_str())
        .collect();
    println!("{best}");
    println!();
    print_segments(&segments, n);
}
