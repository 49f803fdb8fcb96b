//! WAV file export functionality

use std::path::Path;

use crate::{ApuError, Result};

/// Write mono signed 16-bit samples to a WAV file
///
/// # Examples
///
/// ```no_run
/// use gbapu::output::export_to_wav;
///
/// # fn main() -> gbapu::Result<()> {
/// let samples = vec![0i16; 44_100];
/// export_to_wav(&samples, 44_100, "silence.wav")?;
/// # Ok(())
/// # }
/// ```
pub fn export_to_wav<P: AsRef<Path>>(
    samples: &[i16],
    sample_rate: u32,
    output_path: P,
) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(output_path.as_ref(), spec)
        .map_err(|e| ApuError::AudioFileError(format!("Failed to create WAV file: {e}")))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| ApuError::AudioFileError(format!("Failed to write sample: {e}")))?;
    }

    writer
        .finalize()
        .map_err(|e| ApuError::AudioFileError(format!("Failed to finalize WAV file: {e}")))?;

    tracing::info!(
        "Wrote {} samples ({:.2}s) to {}",
        samples.len(),
        samples.len() as f32 / sample_rate as f32,
        output_path.as_ref().display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_round_trip_header_and_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let samples: Vec<i16> = vec![i16::MIN, -1, 0, 1, i16::MAX];

        export_to_wav(&samples, 22_050, &path).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 22_050);
        assert_eq!(spec.bits_per_sample, 16);
        let read: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(read, samples);
    }

    #[test]
    fn test_wav_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.wav");
        assert!(matches!(
            export_to_wav(&[0], 44_100, &path),
            Err(ApuError::AudioFileError(_))
        ));
    }
}
