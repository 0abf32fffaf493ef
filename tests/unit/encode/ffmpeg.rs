use super::*;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig::new(Canvas { width, height }, Fps { num: 60, den: 1 })
}

fn white() -> Rgba8Premul {
    Rgba8Premul::from_straight_rgba(255, 255, 255, 255)
}

#[test]
fn canvas_must_be_even_and_non_empty() {
    assert!(check_encodable(&cfg(0, 10)).is_err());
    assert!(check_encodable(&cfg(11, 10)).is_err());
    assert!(check_encodable(&cfg(10, 7)).is_err());
    assert!(check_encodable(&cfg(960, 760)).is_ok());

    let zero_fps = SinkConfig::new(Canvas { width: 10, height: 10 }, Fps { num: 0, den: 1 });
    assert!(check_encodable(&zero_fps).is_err());
}

#[test]
fn args_describe_raw_input_and_output() {
    let out = PathBuf::from("target/race.mp4");
    let mut opts = FfmpegSinkOpts::new(&out);
    let args = encoder_args(&cfg(240, 64), &opts);
    let has = |s: &str| args.iter().any(|a| a == s);

    assert_eq!(args[0], "-y");
    assert!(has("240x64"));
    assert!(has("60/1"));
    assert!(has("libx264"));
    assert_eq!(args.last(), Some(&out.clone().into_os_string()));

    opts.overwrite = false;
    assert_eq!(encoder_args(&cfg(240, 64), &opts)[0], "-n");
}

#[test]
fn flatten_composites_over_background() {
    let src = [0u8, 0, 0, 0, 1, 2, 3, 255, 128, 0, 0, 128];
    let mut dst = [0u8; 12];
    flatten_onto(&mut dst, &src, white());
    assert_eq!(
        dst,
        [255, 255, 255, 255, 1, 2, 3, 255, 255, 127, 127, 255]
    );
}

#[test]
fn odd_canvas_fails_before_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/unit_ffmpeg/odd.mp4"));
    assert!(sink.begin(cfg(241, 64)).is_err());
    assert!(sink.running.is_none());
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/never.mp4"));
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
    assert!(sink.end().is_err());
}

#[test]
fn streams_frames_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let out = PathBuf::from("target").join("unit_ffmpeg").join("solid.mp4");
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out));
    sink.begin(cfg(4, 2)).unwrap();

    let frame = FrameRGBA {
        width: 4,
        height: 2,
        data: [0u8, 0, 255, 255].repeat(8),
        premultiplied: true,
    };
    sink.push_frame(FrameIndex(0), &frame).unwrap();
    assert!(sink.push_frame(FrameIndex(5), &frame).is_err());
    sink.push_frame(FrameIndex(1), &frame).unwrap();
    sink.end().unwrap();
    assert!(out.is_file());
}
